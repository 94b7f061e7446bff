//! Replace-style upsert statements.
//!
//! An [`UpsertCommand`] renders as `REPLACE INTO <table> (<columns>) VALUES (?, ...)`:
//! the store inserts the row, or atomically replaces an existing row that shares a
//! primary or unique key. Values travel as bound parameters; only the table and
//! column names, which come from the mapping file, are part of the statement text.

use crate::extract::Literal;
use std::fmt;

/// One upsert: target table, columns, and the literals aligned with them.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertCommand {
    table: String,
    columns: Vec<String>,
    literals: Vec<Literal>,
}

/// Reasons an upsert cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatementError {
    #[error("an upsert needs at least one column")]
    NoColumns,

    #[error("{columns} columns but {literals} values")]
    Misaligned { columns: usize, literals: usize },

    #[error("'{identifier}' is not a plain SQL identifier")]
    UnsafeIdentifier { identifier: String },
}

impl UpsertCommand {
    /// Build a command, checking identifiers and column/value alignment.
    pub fn new(
        table: impl Into<String>,
        columns: Vec<String>,
        literals: Vec<Literal>,
    ) -> Result<Self, StatementError> {
        let table = table.into();
        if columns.is_empty() {
            return Err(StatementError::NoColumns);
        }
        if columns.len() != literals.len() {
            return Err(StatementError::Misaligned {
                columns: columns.len(),
                literals: literals.len(),
            });
        }
        if let Some(identifier) = std::iter::once(&table)
            .filter(|table| !is_table_name(table))
            .chain(columns.iter().filter(|column| !is_column_name(column)))
            .next()
        {
            return Err(StatementError::UnsafeIdentifier {
                identifier: identifier.clone(),
            });
        }

        Ok(Self {
            table,
            columns,
            literals,
        })
    }

    /// Build from a descriptor that has already passed validation.
    pub(crate) fn from_validated(table: &str, columns: &[String], literals: Vec<Literal>) -> Self {
        debug_assert_eq!(columns.len(), literals.len());
        Self {
            table: table.to_string(),
            columns: columns.to_vec(),
            literals,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Parameterised statement text, one `?` per column.
    pub fn sql(&self) -> String {
        let placeholders = vec!["?"; self.columns.len()].join(",");
        format!(
            "REPLACE INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(","),
            placeholders
        )
    }
}

/// Diagnostic rendering with the literal text in place of placeholders.
///
/// Never send this to a store: string literals are not escaped.
impl fmt::Display for UpsertCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "REPLACE INTO {} ({}) VALUES (",
            self.table,
            self.columns.join(",")
        )?;
        for (index, literal) in self.literals.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{literal}")?;
        }
        f.write_str(")")
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_column_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A plain identifier, optionally qualified by one schema name (`schema.table`).
pub fn is_table_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((schema, table)) => is_column_name(schema) && is_column_name(table),
        None => is_column_name(name),
    }
}
