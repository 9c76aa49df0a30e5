//! Emitter for the SQLModel data-model module.

use crate::inflect::pascal_case;
use crate::model::{Accessor, AccessorKind, Column, Model, Table};
use crate::types::TypeMap;

/// Render the resolved model as a Python module, one class per table in
/// declaration order.
pub fn generate(model: &Model, types: &TypeMap) -> String {
    let mut output = String::new();
    output.push_str("# Generated by dbmlgen. Do not edit by hand.\n\n");

    let all_types = model
        .tables
        .values()
        .flat_map(|t| t.columns.iter().map(|c| c.typ.as_str()));
    if types.needs_datetime_import(all_types) {
        output.push_str("import datetime\n\n");
    }
    output.push_str("from sqlmodel import Field, Relationship, SQLModel\n");

    for (index, table) in model.tables.values().enumerate() {
        output.push_str("\n\n");
        emit_class(&mut output, model, table, index, types);
    }
    output
}

fn emit_class(output: &mut String, model: &Model, table: &Table, index: usize, types: &TypeMap) {
    output.push_str(&format!(
        "class {}(SQLModel, table=True):\n",
        pascal_case(&table.name)
    ));
    if table.columns.is_empty() && table.accessors.is_empty() {
        output.push_str("    pass\n");
        return;
    }
    for column in &table.columns {
        emit_column(output, column, types);
    }
    if !table.accessors.is_empty() {
        if !table.columns.is_empty() {
            output.push('\n');
        }
        for accessor in &table.accessors {
            emit_accessor(output, model, accessor, index);
        }
    }
}

fn emit_column(output: &mut String, column: &Column, types: &TypeMap) {
    let py_type = types.lookup(&column.typ);
    let optional = !(column.attrs.pk || column.attrs.not_null);

    let mut kwargs: Vec<String> = Vec::new();
    if column.attrs.pk {
        // Default-initialized optional key: the store assigns the value
        kwargs.push("default=None".into());
        kwargs.push("primary_key=True".into());
    }
    if let Some(fk) = &column.foreign_key {
        kwargs.push(format!("foreign_key=\"{}.{}\"", fk.table, fk.column));
    }
    if column.attrs.unique {
        kwargs.push("unique=True".into());
    }
    if column.attrs.index {
        kwargs.push("index=True".into());
    }
    if optional && !kwargs.is_empty() {
        kwargs.insert(0, "default=None".into());
    }

    let annotation = if column.attrs.pk || optional {
        format!("{py_type} | None")
    } else {
        py_type.to_string()
    };

    if !kwargs.is_empty() {
        output.push_str(&format!(
            "    {}: {} = Field({})\n",
            column.name,
            annotation,
            kwargs.join(", ")
        ));
    } else if optional {
        output.push_str(&format!("    {}: {} = None\n", column.name, annotation));
    } else {
        output.push_str(&format!("    {}: {}\n", column.name, annotation));
    }
}

fn emit_accessor(output: &mut String, model: &Model, accessor: &Accessor, index: usize) {
    let class_name = pascal_case(&accessor.target_table);
    // A target declared at or after the owning class does not exist yet at
    // class-body evaluation time, so its name must stay quoted.
    let deferred = match model.tables.get_index_of(&accessor.target_table) {
        Some(target_index) => target_index >= index,
        None => true,
    };
    let annotation = match accessor.kind {
        AccessorKind::Scalar => {
            if deferred {
                format!("\"{class_name} | None\"")
            } else {
                format!("{class_name} | None")
            }
        }
        AccessorKind::Collection => {
            if deferred {
                format!("list[\"{class_name}\"]")
            } else {
                format!("list[{class_name}]")
            }
        }
    };

    let mut call = format!("Relationship(back_populates=\"{}\"", accessor.back_populates);
    if accessor.cascade_delete {
        call.push_str(", cascade_delete=True");
    }
    call.push(')');

    output.push_str(&format!("    {}: {} = {}\n", accessor.name, annotation, call));
}
