//! # cantina-core: Pure Business Logic for Cantina POS
//!
//! This crate holds the domain model and every rule that can be expressed
//! without touching storage: money arithmetic, product form validation,
//! cart assembly and report math.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cantina POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              UI / ticket printer / export (external)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ raw form text, carts                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cantina-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ ProductForm│ │   │
//! │  │   │   Sale    │  │           │  │ CartLine  │  │ validate_all│ │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  cantina-db (Database Layer)                    │   │
//! │  │      Catalog, Ledger, SaleEngine, Reports, migrations           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Sale, SaleLine)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Checkout cart (code + quantity lines)
//! - [`report`] - Value types produced by the reporting queries
//! - [`settings`] - Store-wide limits and PROMO defaults
//! - [`error`] - Domain error types
//! - [`validation`] - Field Validator for the product form
//!
//! ## Example Usage
//!
//! ```rust
//! use cantina_core::validation::{validate_all, ProductForm};
//!
//! let form = ProductForm {
//!     code: "C1".into(),
//!     name: "Cola".into(),
//!     category: "Gaseosa".into(),
//!     size: "500ml".into(),
//!     brand: "X".into(),
//!     quantity: "10".into(),
//!     price: "100,00".into(),
//! };
//!
//! // "C1" is too short for a non-PROMO product
//! assert!(validate_all(&form).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod report;
pub mod settings;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::*;
pub use settings::StoreSettings;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock at or below this (and above zero) counts as "low stock".
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Largest stock quantity the product form accepts.
pub const MAX_STOCK_QUANTITY: i64 = 999_999;

/// Largest unit price the product form accepts, in cents ($9,999,999.00).
pub const MAX_PRICE_CENTS: i64 = 999_999_900;

/// Brand stored for PROMO items entered without one.
pub const DEFAULT_PROMO_BRAND: &str = "Combo Cantina";

/// Prefix of the code generated for PROMO items entered without one.
pub const PROMO_CODE_PREFIX: &str = "PROMO";

/// Payment methods offered at checkout. The ledger stores free text, so this
/// list only seeds the UI.
pub const PAYMENT_METHODS: &[&str] = &[
    "Efectivo",
    "Tarjeta Débito",
    "Tarjeta Crédito",
    "Transferencia",
    "Otro",
];
