//! SQL-backed upsert store.
//!
//! Runs upserts through a sqlx [`AnyPool`], so the same code serves MySQL in
//! production and SQLite for local runs and tests. Both accept `REPLACE INTO`
//! and `?` placeholders.
//!
//! Every upsert follows the same sequence: acquire a connection, ping it,
//! prepare the statement, bind the literals, execute, and hand the connection
//! back to the pool. Any failure is reported with the stage it happened in.

use crate::extract::Literal;
use crate::statement::UpsertCommand;
use crate::storage::{RowId, StoreError, UpsertStore};
use log::debug;
use sqlx::any::{AnyArguments, AnyPoolOptions};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Connection, Executor, Statement};
use std::time::Duration;

const SUPPORTED_SCHEMES: [&str; 3] = ["mysql", "mariadb", "sqlite"];

/// Backend family behind the pool, decided by the URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

/// Upsert store over a lazily connected sqlx pool.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlStore {
    /// Create a store without connecting.
    ///
    /// Connections are opened on first use, so an unreachable database does not
    /// prevent startup; it fails the requests that need it instead.
    ///
    /// # Arguments
    /// * `database_url` - `mysql://`, `mariadb://` or `sqlite:` URL
    /// * `acquire_timeout` - How long a request waits for a connection
    pub fn connect_lazy(database_url: &str, acquire_timeout: Duration) -> Result<Self, StoreError> {
        let dialect = dialect_of(database_url)?;
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)
            .map_err(|e| StoreError::configuration(format!("invalid database URL: {e}")))?;

        Ok(Self { pool, dialect })
    }

    /// Create a store backed by a private in-memory SQLite database.
    ///
    /// The pool holds a single connection that is never recycled, since the
    /// database lives only as long as that connection.
    pub async fn sqlite_in_memory() -> Result<Self, StoreError> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(StoreError::Connect)?;

        Ok(Self {
            pool,
            dialect: Dialect::Sqlite,
        })
    }

    /// Underlying pool, for schema setup and inspection.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl UpsertStore for SqlStore {
    async fn upsert(&self, command: &UpsertCommand) -> Result<RowId, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::Connect)?;
        conn.ping().await.map_err(StoreError::Ping)?;

        let sql = command.sql();
        let statement = (&mut *conn)
            .prepare(&sql)
            .await
            .map_err(StoreError::Prepare)?;

        let query = command
            .literals()
            .iter()
            .fold(statement.query(), bind_literal);
        let result = query
            .execute(&mut *conn)
            .await
            .map_err(StoreError::Execute)?;

        debug!(
            "upsert into {} affected {} row(s)",
            command.table(),
            result.rows_affected()
        );
        // The sqlite driver leaves the id unset through `Any`; the rowid is
        // still per-connection state, so read it before releasing `conn`.
        let row_id = match (result.last_insert_id(), self.dialect) {
            (Some(id), _) => id,
            (None, Dialect::Sqlite) => {
                sqlx::query_scalar::<_, i64>("SELECT last_insert_rowid()")
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(StoreError::Execute)?
            }
            (None, Dialect::MySql) => 0,
        };
        Ok(row_id)
    }
}

fn bind_literal<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    literal: &Literal,
) -> Query<'q, Any, AnyArguments<'q>> {
    match literal {
        Literal::Integer(value) => query.bind(*value),
        Literal::Float(value) => query.bind(*value),
        Literal::Text(value) => query.bind(value.clone()),
        Literal::Empty => query.bind(None::<String>),
    }
}

fn dialect_of(database_url: &str) -> Result<Dialect, StoreError> {
    let scheme = database_url
        .split_once(':')
        .map(|(scheme, _)| scheme)
        .unwrap_or_default();

    match scheme {
        "mysql" | "mariadb" => Ok(Dialect::MySql),
        "sqlite" => Ok(Dialect::Sqlite),
        _ => Err(StoreError::configuration(format!(
            "unsupported database scheme '{scheme}', expected one of {}",
            SUPPORTED_SCHEMES.join(", ")
        ))),
    }
}
