//! # Domain Types
//!
//! Core domain types used throughout Cantina POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code (unique)  │   │  id (monotonic) │   │  product_id     │       │
//! │  │  category       │   │  sold_at        │   │  quantity       │       │
//! │  │  stock          │   │  payment_method │   │  subtotal_cents │       │
//! │  │  price_cents    │   │  total_cents    │   │  + live catalog │       │
//! │  └─────────────────┘   └─────────────────┘   │    fields       │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Category     │   │   SaleRecord    │                             │
//! │  │  Gaseosa ...    │   │  Sale + lines   │                             │
//! │  │  PROMO          │   │  (ticket view)  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! A product is addressed by its `code` everywhere outside storage. The
//! integer row id only links line items to products and never leaves the
//! ledger queries except as `SaleLine::product_id`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Product category. A closed set; `Promo` relaxes the code and brand rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Category {
    Gaseosa,
    Energizante,
    Vino,
    Licor,
    Cerveza,
    Aperitivo,
    /// Bundles and promotional combos.
    #[serde(rename = "PROMO")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "PROMO"))]
    Promo,
    Otros,
}

impl Category {
    /// Every category, in the order the product form lists them.
    pub const ALL: [Category; 8] = [
        Category::Gaseosa,
        Category::Energizante,
        Category::Vino,
        Category::Licor,
        Category::Cerveza,
        Category::Aperitivo,
        Category::Promo,
        Category::Otros,
    ];

    /// Stored and displayed label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Gaseosa => "Gaseosa",
            Category::Energizante => "Energizante",
            Category::Vino => "Vino",
            Category::Licor => "Licor",
            Category::Cerveza => "Cerveza",
            Category::Aperitivo => "Aperitivo",
            Category::Promo => "PROMO",
            Category::Otros => "Otros",
        }
    }

    #[inline]
    pub const fn is_promo(&self) -> bool {
        matches!(self, Category::Promo)
    }

    /// Labels of every category, for error messages and UI pickers.
    pub fn labels() -> Vec<String> {
        Category::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match on the label.
impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "category".to_string(),
                allowed: Category::labels(),
            })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog item.
///
/// This is both what the Field Validator produces and what the catalog
/// returns, so `add(p)` followed by `get_by_code(&p.code)` yields `p` again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique business identifier (barcode or generated PROMO code).
    pub code: String,

    /// Display name shown to the cashier and on tickets.
    pub name: String,

    pub category: Category,

    /// Free-form container size ("500ml", "Pack x6").
    pub size: String,

    pub brand: String,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Unit price in cents.
    pub price_cents: i64,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Value of the units on hand (`stock × price`).
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price().multiply_quantity(self.stock)
    }

    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }

    /// `0 < stock <= threshold`.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock > 0 && self.stock <= threshold
    }

    /// Checks whether `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && quantity <= self.stock
    }
}

// =============================================================================
// Inventory Summary
// =============================================================================

/// Aggregate view of the catalog for the dashboard header.
///
/// `out_of_stock` and `low_stock` partition disjointly: a product is counted
/// in at most one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub total_products: i64,
    pub total_stock: i64,
    /// Σ stock × price, in cents.
    pub inventory_value_cents: i64,
    /// Products with stock <= 0.
    pub out_of_stock: i64,
    /// Products with 0 < stock <= threshold.
    pub low_stock: i64,
}

impl InventorySummary {
    #[inline]
    pub fn inventory_value(&self) -> Money {
        Money::from_cents(self.inventory_value_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Header of a committed checkout. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    /// Local wall-clock time of the checkout, second precision.
    #[ts(as = "String")]
    pub sold_at: NaiveDateTime,
    pub customer: Option<String>,
    pub payment_method: String,
    /// Σ of the line subtotals, in cents.
    pub total_cents: i64,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Values written for a new sale header (the id is assigned by storage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleHeader {
    pub sold_at: NaiveDateTime,
    pub customer: Option<String>,
    pub payment_method: String,
    pub total_cents: i64,
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item joined with the product row it points at.
///
/// Only `quantity` and `subtotal_cents` were captured at sale time. The
/// display fields come from the catalog as it is *now*: renaming a product
/// changes how old tickets read, and a deleted product leaves them `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLine {
    pub product_id: i64,
    pub code: Option<String>,
    pub name: Option<String>,
    pub category: Option<Category>,
    pub size: Option<String>,
    pub brand: Option<String>,
    /// Catalog price today, not at sale time.
    pub current_price_cents: Option<i64>,
    pub quantity: i64,
    /// quantity × price at sale time, in cents.
    pub subtotal_cents: i64,
}

impl SaleLine {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Unit price charged at sale time, recovered from the subtotal.
    pub fn unit_price(&self) -> Money {
        if self.quantity == 0 {
            return Money::zero();
        }
        Money::from_cents(self.subtotal_cents / self.quantity)
    }

    /// The product this line points at no longer exists.
    #[inline]
    pub fn is_orphaned(&self) -> bool {
        self.code.is_none()
    }
}

/// A sale with its lines, ready for a ticket or export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub sale: Sale,
    pub items: Vec<SaleLine>,
}

impl SaleRecord {
    #[inline]
    pub fn total(&self) -> Money {
        self.sale.total()
    }

    /// Σ of line subtotals. Equals [`SaleRecord::total`] for every sale the
    /// engine writes.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(SaleLine::subtotal).sum()
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
