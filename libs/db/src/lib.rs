//! Database handle shared by the server binary and the storage layer.
//!
//! `DbHandle` owns one sqlx pool (SQLite or PostgreSQL, picked from the DSN
//! scheme) and exposes it as a SeaORM `DatabaseConnection`.
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> db::Result<()> {
//!     use db::{ConnectOpts, DbHandle};
//!     use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
//!
//!     let db = DbHandle::connect("sqlite://database/library.db", ConnectOpts::default()).await?;
//!     db.sea()
//!         .execute(Statement::from_string(DatabaseBackend::Sqlite, "SELECT 1"))
//!         .await?;
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod errors;

use std::time::Duration;

#[cfg(feature = "pg")]
use sqlx::postgres::PgPoolOptions;
#[cfg(feature = "sqlite")]
use sqlx::sqlite::SqlitePoolOptions;

use sea_orm::DatabaseConnection;
#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;

use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Connection options. Each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// SQLite-specific: busy timeout used via PRAGMA busy_timeout.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            sqlite_busy_timeout: Some(Duration::from_millis(5_000)),
            create_sqlite_dirs: true,
        }
    }
}

/// Main handle.
pub struct DbHandle {
    engine: DbEngine,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme. The tail (credentials etc.) is left alone.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        tracing::debug!(engine = ?engine, "connecting to database");
        match engine {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect(dsn).await?;
                Ok(Self {
                    engine,
                    sea: SqlxPostgresConnector::from_sqlx_postgres_pool(pool),
                })
            }
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => {
                let dsn = prepare_sqlite_path(dsn, opts.create_sqlite_dirs)?;
                let mut o = SqlitePoolOptions::new();

                // every pooled connection to ":memory:" would open its own database
                if dsn.contains(":memory:") {
                    o = o.max_connections(1).idle_timeout(None).max_lifetime(None);
                } else if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }

                let busy = opts.sqlite_busy_timeout;
                o = o.after_connect(move |conn, _meta| {
                    Box::pin(async move {
                        sqlx::query("PRAGMA journal_mode = WAL")
                            .execute(&mut *conn)
                            .await?;
                        sqlx::query("PRAGMA synchronous = NORMAL")
                            .execute(&mut *conn)
                            .await?;
                        sqlx::query("PRAGMA foreign_keys = ON")
                            .execute(&mut *conn)
                            .await?;
                        if let Some(ms) = busy {
                            // PRAGMA can't use bind parameters; use a numeric literal.
                            let ms = std::cmp::min(ms.as_millis(), i64::MAX as u128) as i64;
                            let stmt = format!("PRAGMA busy_timeout = {ms}");
                            sqlx::query(&stmt).execute(&mut *conn).await?;
                        }
                        Ok(())
                    })
                });

                let pool = o.connect(&dsn).await?;
                Ok(Self {
                    engine,
                    sea: SqlxSqliteConnector::from_sqlx_sqlite_pool(pool),
                })
            }
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        }
    }

    /// Graceful pool close.
    pub async fn close(self) {
        if let Err(e) = self.sea.close().await {
            tracing::warn!(error = %e, "error while closing database pool");
        }
    }

    /// Get the backend.
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Get SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }
}

#[cfg(feature = "sqlite")]
fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> Result<String> {
    if !create_dirs || dsn.contains(":memory:") {
        return Ok(dsn.to_string());
    }

    // Handles "sqlite:/path" and "sqlite://path"; URI forms ("sqlite:file:...") are left alone.
    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    let (path, _query) = raw.split_once('?').unwrap_or((raw, ""));

    if !path.starts_with("file:") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    // sqlx refuses to open a missing file unless asked to create it
    if raw.contains("mode=") || path.starts_with("file:") {
        Ok(dsn.to_string())
    } else if raw.contains('?') {
        Ok(format!("{dsn}&mode=rwc"))
    } else {
        Ok(format!("{dsn}?mode=rwc"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    #[test]
    fn test_backend_detection() {
        assert_eq!(DbHandle::detect("sqlite://test.db").unwrap(), DbEngine::Sqlite);
        assert_eq!(DbHandle::detect("sqlite::memory:").unwrap(), DbEngine::Sqlite);
        assert_eq!(
            DbHandle::detect("postgres://localhost/test").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(
            DbHandle::detect("postgresql://localhost/test").unwrap(),
            DbEngine::Postgres
        );
        assert!(matches!(
            DbHandle::detect("mysql://localhost/test"),
            Err(DbError::UnknownDsn(_))
        ));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_prepare_sqlite_path_creates_parent_and_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("nested/dir/app.db");
        let dsn = format!("sqlite://{}", file.to_string_lossy());

        let prepared = prepare_sqlite_path(&dsn, true).unwrap();
        assert!(file.parent().unwrap().exists());
        assert!(prepared.ends_with("?mode=rwc"));

        assert_eq!(prepare_sqlite_path("sqlite::memory:", true).unwrap(), "sqlite::memory:");
        assert_eq!(
            prepare_sqlite_path(&format!("{dsn}?mode=ro"), true).unwrap(),
            format!("{dsn}?mode=ro")
        );
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_sqlite_memory_connection() -> Result<()> {
        let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
        assert_eq!(db.engine(), DbEngine::Sqlite);

        let conn = db.sea();
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "CREATE TABLE t (id INTEGER PRIMARY KEY)",
        ))
        .await?;
        // same single connection sees the table
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "INSERT INTO t (id) VALUES (1)",
        ))
        .await?;
        db.close().await;
        Ok(())
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_sqlite_file_connection() -> Result<()> {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("data/library.db");
        let dsn = format!("sqlite://{}", file.to_string_lossy());

        let db = DbHandle::connect(&dsn, ConnectOpts::default()).await?;
        db.sea()
            .execute(Statement::from_string(DatabaseBackend::Sqlite, "SELECT 1"))
            .await?;
        assert!(file.exists());
        db.close().await;
        Ok(())
    }
}
