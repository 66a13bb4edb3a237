//! # Ledger Repository
//!
//! Database operations for sales and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. WRITE (inside SaleEngine's transaction only)                        │
//! │     └── insert_sale()      → sales row, id assigned                     │
//! │     └── insert_line_item() → one sale_items row per cart line           │
//! │                                                                         │
//! │  2. READ (any time after commit)                                        │
//! │     └── get_sale(id)       → SaleRecord, lines joined to the catalog    │
//! │     └── recent(limit)      → latest headers                             │
//! │                                                                         │
//! │  There is no update or delete. A committed sale never changes.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Deleted Products
//! Line items keep `product_id` after the product row is deleted. `get_sale`
//! uses a LEFT JOIN, so such a line still comes back with its quantity and
//! subtotal, only without product details. Product ids are AUTOINCREMENT and
//! never reused, so an orphaned line cannot pick up a newer product.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use cantina_core::{Sale, SaleHeader, SaleLine, SaleRecord};

use crate::error::DbResult;

/// Column list for `sales` queries, in `Sale` field order.
const SALE_COLUMNS: &str = "id, sold_at, customer, payment_method, total_cents";

/// Repository for sale ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Writes a sale header on the caller's connection and returns its id.
    ///
    /// Takes a connection rather than the pool so the header lands in the
    /// same transaction as its lines and the stock decrements.
    pub async fn insert_sale(conn: &mut SqliteConnection, header: &SaleHeader) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO sales (sold_at, customer, payment_method, total_cents) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(header.sold_at)
        .bind(header.customer.as_deref())
        .bind(&header.payment_method)
        .bind(header.total_cents)
        .execute(&mut *conn)
        .await?;

        let sale_id = result.last_insert_rowid();
        debug!(sale_id, total_cents = header.total_cents, "Inserted sale header");
        Ok(sale_id)
    }

    /// Writes one line item on the caller's connection.
    pub async fn insert_line_item(
        conn: &mut SqliteConnection,
        sale_id: i64,
        product_id: i64,
        quantity: i64,
        subtotal_cents: i64,
    ) -> DbResult<()> {
        debug!(sale_id, product_id, quantity, "Inserting line item");

        sqlx::query(
            "INSERT INTO sale_items (sale_id, product_id, quantity, subtotal_cents) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(quantity)
        .bind(subtotal_cents)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a sale header by id.
    pub async fn get_header(&self, id: i64) -> DbResult<Option<Sale>> {
        let query = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets a sale with its line items, ready for a ticket.
    ///
    /// Display fields (code, name, category, size, brand, current price)
    /// come from the catalog row as it is now. Lines whose product was
    /// deleted have those fields set to `None`.
    ///
    /// ## Returns
    /// * `Ok(Some(SaleRecord))` - Sale found
    /// * `Ok(None)` - No sale with this id
    pub async fn get_sale(&self, id: i64) -> DbResult<Option<SaleRecord>> {
        debug!(sale_id = id, "Loading sale");

        let Some(sale) = self.get_header(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleLine>(
            "SELECT \
                 si.product_id, \
                 p.code, \
                 p.name, \
                 p.category, \
                 p.size, \
                 p.brand, \
                 p.price_cents AS current_price_cents, \
                 si.quantity, \
                 si.subtotal_cents \
             FROM sale_items si \
             LEFT JOIN products p ON p.id = si.product_id \
             WHERE si.sale_id = ?1 \
             ORDER BY si.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SaleRecord { sale, items }))
    }

    /// Latest sale headers, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let query = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             ORDER BY sold_at DESC, id DESC \
             LIMIT ?1"
        );

        let sales = sqlx::query_as::<_, Sale>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts line items across all sales (for diagnostics).
    pub async fn line_item_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
