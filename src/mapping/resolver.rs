//! Token resolution.
//!
//! Extraction depends on this trait rather than on [`MappingRegistry`]
//! directly, so a request can be resolved against any read-only source of
//! descriptors.

use super::{MappingRegistry, TableDescriptor};

/// Resolves an opaque `Authorization` token to its table descriptor.
///
/// Resolution is a pure read: implementations must not mutate state while
/// serving requests, and the same token must keep resolving to the same
/// descriptor for the life of the process.
///
/// # Example Implementation
///
/// ```rust
/// use json_ingest::extract::extract;
/// use json_ingest::mapping::{MappingResolver, TableDescriptor};
///
/// struct SingleTable {
///     token: String,
///     descriptor: TableDescriptor,
/// }
///
/// impl MappingResolver for SingleTable {
///     fn resolve(&self, token: &str) -> Option<&TableDescriptor> {
///         (token == self.token).then_some(&self.descriptor)
///     }
/// }
///
/// let resolver = SingleTable {
///     token: "tok1".to_string(),
///     descriptor: TableDescriptor::new("users", ["name"], ["n"]),
/// };
/// let command = extract(&resolver, "tok1", br#"{"n":"Alice"}"#)?;
/// assert_eq!(command.table(), "users");
/// # Ok::<(), json_ingest::IngestError>(())
/// ```
pub trait MappingResolver: Send + Sync {
    /// Resolve a token by exact, case-sensitive match.
    ///
    /// # Returns
    /// The registered descriptor, or `None` if the token is unknown
    fn resolve(&self, token: &str) -> Option<&TableDescriptor>;
}

impl MappingResolver for MappingRegistry {
    fn resolve(&self, token: &str) -> Option<&TableDescriptor> {
        self.lookup(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::extract::{Literal, extract};
    use crate::mapping::MappingRegistryBuilder;

    /// Serves every token with the same descriptor.
    struct AnyToken(TableDescriptor);

    impl MappingResolver for AnyToken {
        fn resolve(&self, _token: &str) -> Option<&TableDescriptor> {
            Some(&self.0)
        }
    }

    #[test]
    fn registry_resolves_exact_tokens_only() {
        let registry = MappingRegistryBuilder::new()
            .with_descriptor("tok1", TableDescriptor::new("users", ["name"], ["n"]))
            .build();

        assert_eq!(registry.resolve("tok1").map(|d| d.table()), Some("users"));
        assert!(registry.resolve("tok1 ").is_none());
        assert!(registry.resolve("Bearer tok1").is_none());
    }

    #[test]
    fn extraction_runs_against_any_resolver() {
        let resolver = AnyToken(TableDescriptor::new("events", ["label"], ["l"]));

        let command = extract(&resolver, "whatever", br#"{"l":"boot"}"#).unwrap();

        assert_eq!(command.table(), "events");
        assert_eq!(command.literals(), [Literal::Text("boot".to_string())]);
    }

    #[test]
    fn dyn_resolver_reports_unknown_tokens() {
        let registry = MappingRegistry::default();
        let resolver: &dyn MappingResolver = &registry;

        let error = extract(resolver, "tok1", b"{}").unwrap_err();
        assert!(matches!(error, IngestError::UnknownToken));
    }
}
