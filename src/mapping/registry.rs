//! Token to descriptor registry.
//!
//! The registry is built once at startup and never mutated afterwards, so it is
//! shared between requests behind an `Arc` without any locking.

use super::TableDescriptor;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Immutable mapping from opaque token to [`TableDescriptor`].
///
/// Token lookups are exact, case-sensitive string matches.
///
/// # Example
///
/// ```rust
/// use json_ingest::mapping::MappingRegistry;
///
/// let registry = MappingRegistry::from_json_str(
///     r#"{"tok1": {"Table": "users", "Fields": ["name", "age"], "Alias": ["n", "a"]}}"#,
/// )?;
///
/// assert_eq!(registry.lookup("tok1").map(|d| d.table()), Some("users"));
/// assert!(registry.lookup("TOK1").is_none());
/// # Ok::<(), json_ingest::mapping::MappingError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingRegistry {
    descriptors: HashMap<String, TableDescriptor>,
}

/// Errors loading the mapping file.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("failed to read mapping file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mapping file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl MappingRegistry {
    /// Load the registry from a mapping file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse the registry from mapping file contents.
    pub fn from_json_str(content: &str) -> Result<Self, MappingError> {
        let descriptors: HashMap<String, TableDescriptor> = serde_json::from_str(content)?;
        Ok(Self { descriptors })
    }

    /// Resolve a token to its descriptor.
    pub fn lookup(&self, token: &str) -> Option<&TableDescriptor> {
        self.descriptors.get(token)
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate over `(token, descriptor)` entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableDescriptor)> {
        self.descriptors
            .iter()
            .map(|(token, descriptor)| (token.as_str(), descriptor))
    }
}

impl FromIterator<(String, TableDescriptor)> for MappingRegistry {
    fn from_iter<I: IntoIterator<Item = (String, TableDescriptor)>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

/// Builder for assembling a registry in code.
///
/// A later entry for the same token replaces the earlier one.
///
/// ```rust
/// use json_ingest::mapping::{MappingRegistryBuilder, TableDescriptor};
///
/// let registry = MappingRegistryBuilder::new()
///     .with_descriptor("tok1", TableDescriptor::new("users", ["name"], ["n"]))
///     .with_descriptor("tok2", TableDescriptor::new("orders", ["id"], ["order_id"]))
///     .build();
///
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MappingRegistryBuilder {
    descriptors: Vec<(String, TableDescriptor)>,
}

impl MappingRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under a token.
    pub fn with_descriptor(mut self, token: impl Into<String>, descriptor: TableDescriptor) -> Self {
        self.descriptors.push((token.into(), descriptor));
        self
    }

    pub fn build(self) -> MappingRegistry {
        self.descriptors.into_iter().collect()
    }
}
