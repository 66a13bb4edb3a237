//! # cantina-db: Database Layer for Cantina POS
//!
//! Storage for the beverage catalog and the sale ledger, backed by SQLite
//! through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cantina POS Data Flow                             │
//! │                                                                         │
//! │  Front end (forms, cart, dashboard)                                     │
//! │       │                                                                 │
//! │       │  cantina-core: validate_all(), Cart, ReportMonth               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cantina-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  catalog      │    │ 001_initial  │  │   │
//! │  │   │               │◄───│  ledger       │    │              │  │   │
//! │  │   │ SqlitePool    │    │  engine       │    │              │  │   │
//! │  │   │ StoreSettings │    │  report       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SQLite Database (./cantina.db)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog, ledger, checkout and reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cantina_db::{Database, DbConfig};
//! use cantina_core::{Cart, ReportMonth};
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//!
//! let mut cart = Cart::new();
//! cart.add("G001", 2)?;
//! let sale_id = db.sales().record_sale(&cart, "Efectivo", None).await?;
//!
//! let ticket = db.ledger().get_sale(sale_id).await?;
//! let overview = db.reports().monthly_overview(ReportMonth::of(today)).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DEFAULT_DB_PATH};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::engine::SaleEngine;
pub use repository::ledger::LedgerRepository;
pub use repository::report::ReportRepository;
