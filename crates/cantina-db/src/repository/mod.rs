//! # Repository Module
//!
//! Data access for the catalog, the sale ledger and reports.
//!
//! ## Repositories at a Glance
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Touches Which Table                              │
//! │                                                                         │
//! │                      products      sales      sale_items                │
//! │  CatalogRepository     R/W           -            -                     │
//! │  LedgerRepository       R            R/W          R/W                   │
//! │  SaleEngine            R/W(stock)    W            W     (one tx)        │
//! │  ReportRepository       R            R            R                     │
//! │                                                                         │
//! │  db.catalog().search("cola")                                            │
//! │  db.sales().record_sale(&cart, "Efectivo", None)                        │
//! │  db.reports().monthly_overview(month)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Product CRUD, search and stock summary
//! - [`ledger::LedgerRepository`] - Sale headers and line items
//! - [`engine::SaleEngine`] - Atomic checkout
//! - [`report::ReportRepository`] - Monthly and daily aggregates

pub mod catalog;
pub mod engine;
pub mod ledger;
pub mod report;
