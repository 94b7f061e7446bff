//! Request handling.
//!
//! [`IngestHandler`] is the single boundary where errors stop. It runs
//! credential checks, extraction, and execution, then reduces whatever happened
//! to an [`Acknowledgement`]. The caller only ever learns `Ok` or `Failed`; the
//! cause goes to the log.

use crate::error::{IngestError, IngestResult};
use crate::extract::extract;
use crate::mapping::MappingRegistry;
use crate::storage::{RowId, UpsertStore};
use futures::FutureExt;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use uuid::Uuid;

/// The only two answers a caller can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    Ok,
    Failed,
}

impl Acknowledgement {
    /// Response body text.
    pub fn as_str(self) -> &'static str {
        match self {
            Acknowledgement::Ok => "Ok",
            Acknowledgement::Failed => "Failed",
        }
    }

    pub fn is_ok(self) -> bool {
        self == Acknowledgement::Ok
    }
}

impl fmt::Display for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrates one ingest request against a shared registry and store.
pub struct IngestHandler<S> {
    registry: Arc<MappingRegistry>,
    store: S,
}

impl<S: UpsertStore> IngestHandler<S> {
    /// Create a handler over a loaded registry and a store.
    pub fn new(registry: Arc<MappingRegistry>, store: S) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle a request and produce its acknowledgement.
    ///
    /// Succeeds only when the credential and body are present, extraction
    /// succeeds, and the store executes the upsert. Every other path, a panic
    /// inside extraction or execution included, yields `Failed`.
    pub async fn handle(&self, authorization: &str, body: &[u8]) -> Acknowledgement {
        let request_id = Uuid::new_v4();

        let outcome = AssertUnwindSafe(self.ingest(authorization, body))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(IngestError::internal(panic_message(panic.as_ref()))));

        match outcome {
            Ok(row_id) => {
                debug!(
                    "ingest ok: token {} insert id {} (request: '{}')",
                    token_fingerprint(authorization),
                    row_id,
                    request_id
                );
                Acknowledgement::Ok
            }
            Err(e) if e.is_server_fault() => {
                warn!(
                    "ingest failed [{}]: {} (token: {}, request: '{}')",
                    e.kind(),
                    e,
                    token_fingerprint(authorization),
                    request_id
                );
                Acknowledgement::Failed
            }
            Err(e) => {
                debug!(
                    "ingest failed [{}]: {} (token: {}, request: '{}')",
                    e.kind(),
                    e,
                    token_fingerprint(authorization),
                    request_id
                );
                Acknowledgement::Failed
            }
        }
    }

    /// Run a request and report the detailed result.
    ///
    /// This is [`handle`](Self::handle) without the collapse to an
    /// acknowledgement and without panic recovery.
    pub async fn ingest(&self, authorization: &str, body: &[u8]) -> IngestResult<RowId> {
        if authorization.is_empty() {
            return Err(IngestError::MissingCredential);
        }
        if body.is_empty() {
            return Err(IngestError::EmptyBody);
        }

        let command = extract(self.registry.as_ref(), authorization, body)?;
        debug!("executing {command}");

        let row_id = self.store.upsert(&command).await?;
        Ok(row_id)
    }
}

/// Short, log-safe stand-in for a token: the first 12 hex digits of its SHA-256.
pub fn token_fingerprint(token: &str) -> String {
    if token.is_empty() {
        return "<none>".to_string();
    }
    let digest = format!("{:x}", Sha256::digest(token.as_bytes()));
    digest[..12].to_string()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{MappingRegistryBuilder, TableDescriptor};
    use crate::statement::UpsertCommand;
    use crate::storage::StoreError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        commands: Mutex<Vec<UpsertCommand>>,
    }

    impl UpsertStore for RecordingStore {
        async fn upsert(&self, command: &UpsertCommand) -> Result<RowId, StoreError> {
            let mut commands = self.commands.lock().unwrap();
            commands.push(command.clone());
            Ok(commands.len() as RowId)
        }
    }

    fn handler() -> IngestHandler<RecordingStore> {
        let registry = MappingRegistryBuilder::new()
            .with_descriptor(
                "tok1",
                TableDescriptor::new("users", ["name", "age"], ["n", "a"]),
            )
            .build();
        IngestHandler::new(Arc::new(registry), RecordingStore::default())
    }

    #[tokio::test]
    async fn successful_request_is_acknowledged() {
        let handler = handler();
        let ack = handler.handle("tok1", br#"{"n":"Alice","a":30}"#).await;

        assert_eq!(ack, Acknowledgement::Ok);
        let commands = handler.store().commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].to_string(),
            "REPLACE INTO users (name,age) VALUES (\"Alice\",30)"
        );
    }

    #[tokio::test]
    async fn missing_inputs_fail_without_store_interaction() {
        let handler = handler();

        assert!(matches!(
            handler.ingest("", br#"{"n":"Alice"}"#).await,
            Err(IngestError::MissingCredential)
        ));
        assert!(matches!(
            handler.ingest("tok1", b"").await,
            Err(IngestError::EmptyBody)
        ));
        assert_eq!(handler.handle("", b"{}").await, Acknowledgement::Failed);
        assert!(handler.store().commands.lock().unwrap().is_empty());
    }

    #[test]
    fn acknowledgement_text() {
        assert_eq!(Acknowledgement::Ok.as_str(), "Ok");
        assert_eq!(Acknowledgement::Failed.to_string(), "Failed");
        assert!(!Acknowledgement::Failed.is_ok());
    }

    #[test]
    fn fingerprint_hides_token() {
        let fingerprint = token_fingerprint("secret-token");
        assert_eq!(fingerprint.len(), 12);
        assert!(!fingerprint.contains("secret"));
        assert_eq!(fingerprint, token_fingerprint("secret-token"));
        assert_ne!(fingerprint, token_fingerprint("secret-token2"));
        assert_eq!(token_fingerprint(""), "<none>");
    }

    #[test]
    fn panic_messages_are_extracted() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "panic: static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "panic: owned");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "panic with non-string payload");
    }
}
