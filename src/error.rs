//! Error types for request handling.
//!
//! Every failure a single ingest request can hit is a variant of [`IngestError`].
//! None of them reach the caller: the handler collapses all of them into the same
//! `Failed` acknowledgement and only logs the detail server-side.

use crate::mapping::DescriptorError;
use crate::storage::StoreError;

/// Request-scoped error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The `Authorization` header was missing or empty
    #[error("missing authorization token")]
    MissingCredential,

    /// The request carried no body
    #[error("empty request body")]
    EmptyBody,

    /// No descriptor is registered for the presented token
    #[error("no table registered for token")]
    UnknownToken,

    /// The registered descriptor is unusable; a configuration defect, not a caller defect
    #[error("invalid mapping for table '{table}': {source}")]
    InvalidMapping {
        table: String,
        #[source]
        source: DescriptorError,
    },

    /// The body is not a well-formed JSON object
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),

    /// The store rejected or could not run the upsert
    #[error("execution failed: {0}")]
    Execution(#[from] StoreError),

    /// Unexpected fault recovered at the handler boundary
    #[error("internal fault: {message}")]
    Internal { message: String },
}

/// Why a request body could not be used as a payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

impl IngestError {
    /// Create an internal fault error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::EmptyBody => "empty_body",
            Self::UnknownToken => "unknown_token",
            Self::InvalidMapping { .. } => "invalid_mapping",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::Execution(_) => "execution",
            Self::Internal { .. } => "internal",
        }
    }

    /// Whether the fault lies with the service rather than the caller.
    ///
    /// Server-side faults are logged at `warn`; caller faults only at `debug`.
    pub fn is_server_fault(&self) -> bool {
        matches!(self, Self::InvalidMapping { .. } | Self::Internal { .. })
    }
}

/// Result alias for request handling.
pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct_labels() {
        let errors = [
            IngestError::MissingCredential,
            IngestError::EmptyBody,
            IngestError::UnknownToken,
            IngestError::InvalidMapping {
                table: "users".to_string(),
                source: DescriptorError::NoColumns,
            },
            IngestError::MalformedPayload(PayloadError::NotAnObject { found: "array" }),
            IngestError::Execution(StoreError::configuration("bad url")),
            IngestError::internal("boom"),
        ];

        let mut kinds: Vec<_> = errors.iter().map(IngestError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn invalid_mapping_names_the_table() {
        let error = IngestError::InvalidMapping {
            table: "orders".to_string(),
            source: DescriptorError::LengthMismatch {
                columns: 2,
                payload_keys: 1,
            },
        };

        let message = error.to_string();
        assert!(message.contains("orders"));
        assert!(message.contains("2 columns"));
        assert!(error.is_server_fault());
    }

    #[test]
    fn payload_json_errors_convert() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: IngestError = PayloadError::from(json_error).into();
        assert_eq!(error.kind(), "malformed_payload");
        assert!(!error.is_server_fault());
    }
}
