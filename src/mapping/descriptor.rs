//! Table descriptors: where a token's payload lands.

use crate::statement::{is_column_name, is_table_name};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Destination table and positional column/payload-key pairing for one token.
///
/// The JSON shape matches the mapping file entries:
///
/// ```json
/// { "Table": "users", "Fields": ["name", "age"], "Alias": ["n", "a"] }
/// ```
///
/// Missing keys deserialize as empty so that an incomplete entry surfaces as a
/// per-request [`DescriptorError`] instead of a load failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    #[serde(rename = "Table", default)]
    table: String,
    #[serde(rename = "Fields", default)]
    columns: Vec<String>,
    #[serde(rename = "Alias", default)]
    payload_keys: Vec<String>,
}

/// Ways a descriptor can be unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("table name is empty")]
    EmptyTable,

    #[error("no columns declared")]
    NoColumns,

    #[error("no payload keys declared")]
    NoPayloadKeys,

    #[error("{columns} columns but {payload_keys} payload keys")]
    LengthMismatch { columns: usize, payload_keys: usize },

    #[error("column '{column}' declared more than once")]
    DuplicateColumn { column: String },

    #[error("'{identifier}' is not a plain SQL identifier")]
    UnsafeIdentifier { identifier: String },
}

impl TableDescriptor {
    /// Create a descriptor.
    pub fn new<C, K>(table: impl Into<String>, columns: C, payload_keys: K) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            payload_keys: payload_keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Target table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Destination columns, in declared order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Payload keys, positionally paired with [`columns`](Self::columns).
    pub fn payload_keys(&self) -> &[String] {
        &self.payload_keys
    }

    /// Iterate `(column, payload_key)` pairs in declared order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.payload_keys.iter().map(String::as_str))
    }

    /// Check the descriptor can produce a well-formed upsert.
    ///
    /// Table and column names are embedded in statement text, so beyond the
    /// shape checks they must be plain identifiers.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.table.is_empty() {
            return Err(DescriptorError::EmptyTable);
        }
        if self.columns.is_empty() {
            return Err(DescriptorError::NoColumns);
        }
        if self.payload_keys.is_empty() {
            return Err(DescriptorError::NoPayloadKeys);
        }
        if self.columns.len() != self.payload_keys.len() {
            return Err(DescriptorError::LengthMismatch {
                columns: self.columns.len(),
                payload_keys: self.payload_keys.len(),
            });
        }
        if !is_table_name(&self.table) {
            return Err(DescriptorError::UnsafeIdentifier {
                identifier: self.table.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !is_column_name(column) {
                return Err(DescriptorError::UnsafeIdentifier {
                    identifier: column.clone(),
                });
            }
            if !seen.insert(column.as_str()) {
                return Err(DescriptorError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }

        Ok(())
    }
}
