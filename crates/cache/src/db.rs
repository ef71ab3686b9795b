//! SQLite connection pool shared by the catalog and the shelf repository.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::sqlite::{
    SqliteAutoVacuum, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Readers run in parallel under WAL; writers queue on the single write lock.
const MAX_CONNECTIONS: u32 = 4;
/// How long a writer waits for the write lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A transaction holding the database's write lock.
pub(crate) type WriteTx = Transaction<'static, Sqlite>;

/// Handle to the folio database.
///
/// Build a [`Catalog`](crate::Catalog) or [`Repository`](crate::Repository)
/// from it; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database file at `path`, creating it if needed, and bring its
    /// schema up to date.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = connect_options().filename(path).create_if_missing(true);
        Self::open(options, MAX_CONNECTIONS).await
    }

    /// Open a private database that disappears with the last clone of the
    /// returned handle.
    ///
    /// Each connection to `:memory:` sees its own empty database, so the pool
    /// is limited to one connection.
    pub async fn connect_in_memory() -> Result<Self> {
        Self::open(connect_options().in_memory(true), 1).await
    }

    async fn open(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        debug!(migrations = MIGRATOR.iter().count(), "database ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for checked-out connections and close the pool. SQLite refreshes
    /// its planner statistics as each connection closes.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Start a transaction that takes the write lock with its `BEGIN`.
///
/// A deferred transaction that reads before it writes cannot wait for the
/// lock once another writer has committed in between; SQLite fails it with
/// `SQLITE_BUSY` right away. Taking the lock up front lets concurrent writers
/// queue on the busy timeout instead.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<WriteTx> {
    pool.begin_with("BEGIN IMMEDIATE").await.or_raise(|| ErrorKind::Database)
}

fn connect_options() -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
        // Memberships churn; free pages are returned without a full VACUUM.
        .auto_vacuum(SqliteAutoVacuum::Incremental)
        .pragma("cache_size", "-4096")
        .pragma("temp_store", "MEMORY")
        .optimize_on_close(true, 400)
}
