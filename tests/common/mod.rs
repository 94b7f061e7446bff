//! Shared fixtures and store doubles for integration tests.

#![allow(dead_code)]

use json_ingest::mapping::{MappingRegistryBuilder, TableDescriptor};
use json_ingest::storage::{RowId, StoreError, UpsertStore};
use json_ingest::{IngestHandler, MappingRegistry, UpsertCommand};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Registry used across scenarios:
///
/// * `tok1` - `users(name, age)` fed by payload keys `n`, `a`
/// * `tok2` - `readings(sensor, value, note)` fed by `id`, `v`, `text`
/// * `broken` - descriptor with more columns than payload keys
pub fn registry() -> MappingRegistry {
    MappingRegistryBuilder::new()
        .with_descriptor(
            "tok1",
            TableDescriptor::new("users", ["name", "age"], ["n", "a"]),
        )
        .with_descriptor(
            "tok2",
            TableDescriptor::new("readings", ["sensor", "value", "note"], ["id", "v", "text"]),
        )
        .with_descriptor(
            "broken",
            TableDescriptor::new("users", ["name", "age"], ["n"]),
        )
        .build()
}

pub fn handler_with<S: UpsertStore>(store: S) -> IngestHandler<S> {
    IngestHandler::new(Arc::new(registry()), store)
}

/// Records every command it is asked to run and reports sequential row ids.
#[derive(Debug, Default)]
pub struct RecordingStore {
    commands: Mutex<Vec<UpsertCommand>>,
}

impl RecordingStore {
    pub fn commands(&self) -> Vec<UpsertCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl UpsertStore for RecordingStore {
    async fn upsert(&self, command: &UpsertCommand) -> Result<RowId, StoreError> {
        let mut commands = self.commands.lock().unwrap();
        commands.push(command.clone());
        Ok(commands.len() as RowId)
    }
}

/// A store whose connection can never be established.
#[derive(Debug, Default)]
pub struct UnreachableStore {
    attempts: AtomicUsize,
}

impl UnreachableStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl UpsertStore for UnreachableStore {
    async fn upsert(&self, _command: &UpsertCommand) -> Result<RowId, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Connect(sqlx::Error::PoolTimedOut))
    }
}

/// A store whose pooled connection is dead: acquired, but never answers a ping.
#[derive(Debug, Default)]
pub struct DeadConnectionStore;

impl UpsertStore for DeadConnectionStore {
    async fn upsert(&self, _command: &UpsertCommand) -> Result<RowId, StoreError> {
        Err(StoreError::Ping(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ))))
    }
}

/// A store that panics mid-execution.
#[derive(Debug, Default)]
pub struct PanickingStore;

impl UpsertStore for PanickingStore {
    async fn upsert(&self, command: &UpsertCommand) -> Result<RowId, StoreError> {
        panic!("store exploded while writing {}", command.table());
    }
}
