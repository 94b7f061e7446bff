//! Storage abstraction for upserts.
//!
//! The [`UpsertStore`] trait is the seam between request handling and the
//! relational store. The service itself runs on [`SqlStore`]; tests substitute
//! their own implementations to observe or fail executions.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use json_ingest::extract::Literal;
//! use json_ingest::statement::UpsertCommand;
//! use json_ingest::storage::{SqlStore, UpsertStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqlStore::sqlite_in_memory().await?;
//! sqlx::query("CREATE TABLE users (name TEXT PRIMARY KEY, age INTEGER)")
//!     .execute(store.pool())
//!     .await?;
//!
//! let command = UpsertCommand::new(
//!     "users",
//!     vec!["name".to_string(), "age".to_string()],
//!     vec![Literal::Text("Alice".to_string()), Literal::Integer(30)],
//! )?;
//! let row_id = store.upsert(&command).await?;
//! println!("Insert id {row_id}");
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod sql;

pub use errors::StoreError;
pub use sql::{Dialect, SqlStore};

use crate::statement::UpsertCommand;
use std::future::Future;

/// Identifier the store assigned to the affected row.
///
/// Stores that report no identifier (MySQL, for tables without an
/// auto-increment key) yield `0`.
pub type RowId = i64;

/// A relational store that can execute replace-style upserts.
///
/// Implementations own connection handling. Each call is independent: there is
/// no batching, retry, or cross-call ordering.
pub trait UpsertStore: Send + Sync {
    /// Execute one upsert and return the affected row's identifier.
    ///
    /// # Errors
    /// Returns a [`StoreError`] naming the stage (connect, ping, prepare, execute)
    /// that failed.
    fn upsert(
        &self,
        command: &UpsertCommand,
    ) -> impl Future<Output = Result<RowId, StoreError>> + Send;
}
