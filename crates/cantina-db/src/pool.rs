//! # Database Handle
//!
//! [`DbConfig`] says where the store lives and how the pool behaves;
//! [`Database`] owns the pool and hands out the repositories.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::from_env()        CANTINA_DB_PATH, pool size, busy timeout   │
//! │  StoreSettings::from_env()   low-stock threshold, promo defaults        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::with_settings(config, settings)                              │
//! │       ├── open ./cantina.db (created on first run, WAL journal)         │
//! │       ├── apply migrations/sqlite/*                                     │
//! │       └── keep StoreSettings for the repositories                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  catalog()   ledger()   sales()   reports()                             │
//! │  each call clones the pool handle; nothing is global                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! With the WAL journal, reports and catalog reads run while a sale commits.
//! Writes still go one at a time. A write that waits longer than
//! `busy_timeout` comes back as [`DbError::Busy`], which callers may retry.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use cantina_core::StoreSettings;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::engine::SaleEngine;
use crate::repository::ledger::LedgerRepository;
use crate::repository::report::ReportRepository;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "./cantina.db";

// =============================================================================
// Configuration
// =============================================================================

/// Where the store lives and how its pool behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/cantina/pos.db")
///     .max_connections(4)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Pool ceiling. Default 5, plenty for one till plus the dashboard.
    pub max_connections: u32,

    /// Connections kept open while idle. Default 1.
    pub min_connections: u32,

    /// How long to wait for a free pooled connection. Default 30 s.
    pub connect_timeout: Duration,

    /// Idle connections above `min_connections` are closed after this.
    /// Default 10 min.
    pub idle_timeout: Duration,

    /// How long a statement waits on another connection's lock before
    /// failing with `SQLITE_BUSY`. Default 5 s.
    pub busy_timeout: Duration,

    /// Apply pending migrations when opening. Default on.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Defaults for a file at `path`. The file is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the lock wait before a write gives up with `Busy`.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Private in-memory store for tests.
    ///
    /// Every SQLite connection to `:memory:` gets its own empty database, so
    /// the pool is pinned to a single connection that never idles out.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// SQLite pragmas applied to every pooled connection: WAL journal,
    /// `synchronous = NORMAL`, foreign keys on and the configured busy wait.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout);

        debug!(
            busy_timeout_ms = self.busy_timeout.as_millis() as u64,
            "Connection options configured"
        );
        Ok(options)
    }

    /// Creates a configuration from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CANTINA_DB_PATH`: database file (default `./cantina.db`)
    /// - `CANTINA_DB_MAX_CONNECTIONS`: pool size
    /// - `CANTINA_DB_BUSY_TIMEOUT_MS`: lock wait in milliseconds
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("CANTINA_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let mut config = DbConfig::new(path);

        if let Some(raw) = lookup("CANTINA_DB_MAX_CONNECTIONS") {
            match raw.trim().parse::<u32>() {
                Ok(max) if max > 0 => config.max_connections = max,
                _ => warn!(value = %raw, "Ignoring invalid CANTINA_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(raw) = lookup("CANTINA_DB_BUSY_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.busy_timeout = Duration::from_millis(ms),
                Err(_) => warn!(value = %raw, "Ignoring invalid CANTINA_DB_BUSY_TIMEOUT_MS"),
            }
        }

        config
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing access to the store components.
///
/// Built once at startup and passed to whoever needs it. Cloning is cheap:
/// every clone shares the same pool.
///
/// ```text
/// Database
///   ├── catalog()  → CatalogRepository   product CRUD and queries
///   ├── ledger()   → LedgerRepository    sale headers and lines
///   ├── sales()    → SaleEngine          atomic checkout
///   └── reports()  → ReportRepository    read-only aggregates
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    settings: StoreSettings,
}

impl Database {
    /// Opens the store with default [`StoreSettings`].
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        Self::with_settings(config, StoreSettings::default()).await
    }

    /// Opens the store, creating the file if needed, and applies pending
    /// migrations unless `config.run_migrations` is off.
    pub async fn with_settings(config: DbConfig, settings: StoreSettings) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening store");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            low_stock_threshold = settings.low_stock_threshold,
            "Store pool ready"
        );

        let db = Database { pool, settings };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending migrations. Already-applied ones are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for callers that need their own transaction.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Returns the catalog (product) repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let products = db.catalog().search("cola").await?;
    /// ```
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone(), self.settings.low_stock_threshold)
    }

    /// Returns the sale ledger repository.
    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.pool.clone())
    }

    /// Returns the checkout engine.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let sale_id = db.sales().record_sale(&cart, "Efectivo", None).await?;
    /// ```
    pub fn sales(&self) -> SaleEngine {
        SaleEngine::new(self.pool.clone())
    }

    /// Returns the reporting queries.
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards; report queries
    /// degrade to empty results.
    pub async fn close(&self) {
        info!("Closing store");
        self.pool.close().await;
    }

    /// `true` when a trivial query goes through.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
