//! Resolved schema model: the table map plus normalized relationships and
//! the accessor descriptors derived from them.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use crate::ast::{ColumnAttrs, Document};
use crate::inflect::{Pluralizer, snake_case};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
    #[error("duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),
    #[error("cannot name relationship accessor on table {table}: {accessor} is already taken")]
    AmbiguousRelationship { table: String, accessor: String },
    #[error("column {column} in table {table} is increment but not pk")]
    IncrementWithoutPrimaryKey { table: String, column: String },
    #[error("table {0} has more than one increment column")]
    MultipleIncrementColumns(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Insertion order is declaration order.
    pub tables: IndexMap<String, Table>,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    /// In relationship-discovery order.
    pub accessors: Vec<Accessor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub typ: String,
    pub attrs: ColumnAttrs,
    pub foreign_key: Option<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub delete_cascade: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccessorKind {
    /// Optional single object on the foreign-key side.
    Scalar,
    /// List of referring objects on the referenced side.
    Collection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub name: String,
    pub target_table: String,
    pub kind: AccessorKind,
    /// Name of the accessor on the other side of the relationship.
    pub back_populates: String,
    pub cascade_delete: bool,
}

impl Model {
    pub fn from_document(
        document: &Document,
        pluralizer: &Pluralizer,
    ) -> Result<Self, ResolveError> {
        let mut tables: IndexMap<String, Table> = IndexMap::new();

        for def in &document.tables {
            if tables.contains_key(&def.name) {
                return Err(ResolveError::DuplicateTable(def.name.clone()));
            }
            let mut seen: HashSet<&str> = HashSet::new();
            let mut increment_count = 0;
            for col in &def.columns {
                if !seen.insert(col.name.as_str()) {
                    return Err(ResolveError::DuplicateColumn {
                        table: def.name.clone(),
                        column: col.name.clone(),
                    });
                }
                if col.attrs.increment {
                    increment_count += 1;
                    if !col.attrs.pk {
                        return Err(ResolveError::IncrementWithoutPrimaryKey {
                            table: def.name.clone(),
                            column: col.name.clone(),
                        });
                    }
                }
            }
            if increment_count > 1 {
                return Err(ResolveError::MultipleIncrementColumns(def.name.clone()));
            }
            tables.insert(
                def.name.clone(),
                Table {
                    name: def.name.clone(),
                    columns: def
                        .columns
                        .iter()
                        .map(|c| Column {
                            name: c.name.clone(),
                            typ: c.typ.clone(),
                            attrs: c.attrs,
                            foreign_key: None,
                        })
                        .collect(),
                    accessors: Vec::new(),
                },
            );
        }

        // Accessor names must not collide with column names or each other.
        let mut namespaces: IndexMap<String, HashSet<String>> = tables
            .iter()
            .map(|(name, table)| {
                (
                    name.clone(),
                    table.columns.iter().map(|c| c.name.clone()).collect(),
                )
            })
            .collect();

        let mut relationships = Vec::new();
        for r in &document.refs {
            let target = tables
                .get(&r.to_table)
                .ok_or_else(|| dangling(&r.to_table, &r.to_column))?;
            if !target.columns.iter().any(|c| c.name == r.to_column) {
                return Err(dangling(&r.to_table, &r.to_column));
            }
            let source = tables
                .get(&r.from_table)
                .ok_or_else(|| dangling(&r.from_table, &r.from_column))?;
            if !source.columns.iter().any(|c| c.name == r.from_column) {
                return Err(dangling(&r.from_table, &r.from_column));
            }

            let namespace = namespaces
                .get_mut(&r.from_table)
                .ok_or_else(|| dangling(&r.from_table, &r.from_column))?;
            let scalar_name = claim(namespace, &snake_case(&r.to_table), &r.from_column, &r.from_table)?;
            let namespace = namespaces
                .get_mut(&r.to_table)
                .ok_or_else(|| dangling(&r.to_table, &r.to_column))?;
            let collection_name = claim(
                namespace,
                &pluralizer.pluralize(&snake_case(&r.from_table)),
                &r.from_column,
                &r.to_table,
            )?;
            debug!(
                "resolved {}.{} > {}.{} as {scalar_name}/{collection_name}",
                r.from_table, r.from_column, r.to_table, r.to_column
            );

            let source = tables
                .get_mut(&r.from_table)
                .ok_or_else(|| dangling(&r.from_table, &r.from_column))?;
            if let Some(col) = source.columns.iter_mut().find(|c| c.name == r.from_column) {
                col.foreign_key = Some(ForeignKey {
                    table: r.to_table.clone(),
                    column: r.to_column.clone(),
                });
            }
            source.accessors.push(Accessor {
                name: scalar_name.clone(),
                target_table: r.to_table.clone(),
                kind: AccessorKind::Scalar,
                back_populates: collection_name.clone(),
                cascade_delete: false,
            });

            let target = tables
                .get_mut(&r.to_table)
                .ok_or_else(|| dangling(&r.to_table, &r.to_column))?;
            target.accessors.push(Accessor {
                name: collection_name,
                target_table: r.from_table.clone(),
                kind: AccessorKind::Collection,
                back_populates: scalar_name,
                cascade_delete: r.delete_cascade,
            });

            relationships.push(Relationship {
                from_table: r.from_table.clone(),
                from_column: r.from_column.clone(),
                to_table: r.to_table.clone(),
                to_column: r.to_column.clone(),
                delete_cascade: r.delete_cascade,
            });
        }

        Ok(Model {
            tables,
            relationships,
        })
    }
}

fn dangling(table: &str, column: &str) -> ResolveError {
    ResolveError::UnresolvedReference(format!("{table}.{column}"))
}

/// Claim a name in a table's accessor namespace. On collision, retry once
/// with the foreign-key column appended; a second collision is fatal.
fn claim(
    namespace: &mut HashSet<String>,
    base: &str,
    fk_column: &str,
    table: &str,
) -> Result<String, ResolveError> {
    if namespace.insert(base.to_string()) {
        return Ok(base.to_string());
    }
    let suffixed = format!("{base}_{fk_column}");
    if namespace.insert(suffixed.clone()) {
        return Ok(suffixed);
    }
    Err(ResolveError::AmbiguousRelationship {
        table: table.to_string(),
        accessor: suffixed,
    })
}
