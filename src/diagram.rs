//! Emitter for the ER document: a mermaid diagram block followed by
//! per-table column documentation.

use unicode_width::UnicodeWidthStr;

use crate::model::{Model, Table};
use crate::types::TypeMap;

pub fn generate(model: &Model, types: &TypeMap) -> String {
    let mut output = String::new();
    output.push_str("# Schema\n\n");
    output.push_str("```mermaid\nerDiagram\n");

    for table in model.tables.values() {
        output.push_str(&format!("    {} {{\n", ident(&table.name)));
        for column in &table.columns {
            output.push_str(&format!(
                "        {} {}",
                types.lookup_short(&column.typ),
                ident(&column.name)
            ));
            let mut keys: Vec<&str> = Vec::new();
            if column.attrs.pk {
                keys.push("PK");
            }
            if column.foreign_key.is_some() {
                keys.push("FK");
            }
            if !keys.is_empty() {
                output.push(' ');
                output.push_str(&keys.join(", "));
            }
            output.push('\n');
        }
        output.push_str("    }\n");
    }

    // One edge per relationship, many side on the left
    for rel in &model.relationships {
        output.push_str(&format!(
            "    {} }}o--|| {} : \"{}\"\n",
            ident(&rel.from_table),
            ident(&rel.to_table),
            rel.from_column
        ));
    }
    output.push_str("```\n");

    for table in model.tables.values() {
        output.push('\n');
        emit_table_doc(&mut output, table, types);
    }
    output
}

/// Mermaid identifiers cannot carry spaces or punctuation.
fn ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn emit_table_doc(output: &mut String, table: &Table, types: &TypeMap) {
    output.push_str(&format!("## {}\n\n", table.name));

    let header = ["Column", "Type", "Nullable", "Primary Key"];
    let rows: Vec<[String; 4]> = table
        .columns
        .iter()
        .map(|column| {
            let nullable = if column.attrs.pk || column.attrs.not_null {
                "no"
            } else {
                "yes"
            };
            let pk = if column.attrs.pk { "yes" } else { "no" };
            [
                column.name.clone(),
                types.lookup_short(&column.typ).to_string(),
                nullable.to_string(),
                pk.to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(UnicodeWidthStr::width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    push_row(output, &header.map(String::from), &widths);
    push_row(output, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &rows {
        push_row(output, row, &widths);
    }
}

fn push_row(output: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    output.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width.saturating_sub(UnicodeWidthStr::width(cell.as_str()));
        output.push(' ');
        output.push_str(cell);
        output.push_str(&" ".repeat(pad));
        output.push_str(" |");
    }
    output.push('\n');
}
