//! Store-layer errors.
//!
//! Each variant names the stage that failed and carries the driver error as its
//! source, so the full cause chain is available to server-side logging.

/// Errors raised while running an upsert against the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection could be acquired from the pool
    #[error("failed to connect to the store: {0}")]
    Connect(#[source] sqlx::Error),

    /// A connection was acquired but did not answer a ping
    #[error("store did not answer ping: {0}")]
    Ping(#[source] sqlx::Error),

    /// The store rejected the statement when preparing it
    #[error("failed to prepare statement: {0}")]
    Prepare(#[source] sqlx::Error),

    /// The prepared statement failed to execute
    #[error("failed to execute statement: {0}")]
    Execute(#[source] sqlx::Error),

    /// The store client could not be set up from the given settings
    #[error("store configuration error: {message}")]
    Configuration { message: String },
}

impl StoreError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Name of the failed stage, for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect",
            Self::Ping(_) => "ping",
            Self::Prepare(_) => "prepare",
            Self::Execute(_) => "execute",
            Self::Configuration { .. } => "configuration",
        }
    }
}
