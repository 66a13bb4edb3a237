//! # Sale Engine
//!
//! Atomic checkout: validate a cart against live stock, then write the sale
//! header, its line items and the stock decrements as one transaction.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       record_sale(cart, payment, customer)              │
//! │                                                                         │
//! │  1. cart empty? ─────────────────────────────► EmptyCart                │
//! │     any quantity <= 0? ──────────────────────► ValidationError          │
//! │                                                                         │
//! │  2. BEGIN IMMEDIATE (takes the write lock)                              │
//! │     for each line:                                                      │
//! │       SELECT id, stock, price_cents WHERE code = ?                      │
//! │         missing? ────────────────────────────► ProductNotFound          │
//! │       demand[product] += quantity                                       │
//! │         demand > stock? ─────────────────────► InsufficientStock        │
//! │       subtotal = quantity × price                                       │
//! │                                                                         │
//! │  3. INSERT sales (total = Σ subtotals)                                  │
//! │     INSERT sale_items × lines                                           │
//! │     UPDATE products SET stock = stock - demand                          │
//! │       WHERE id = ? AND stock >= demand                                  │
//! │         0 rows? ─────────────────────────────► InsufficientStock        │
//! │                                                                         │
//! │  4. COMMIT → sale id                                                    │
//! │                                                                         │
//! │  Any error drops the transaction: nothing is written.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The transaction opens with `BEGIN IMMEDIATE`, so it holds SQLite's write
//! lock before the first stock read. A second checkout waits up to
//! `busy_timeout` for that lock and then reads the committed stock, which
//! makes check-then-decrement serial per database. Sales on different
//! products therefore both succeed, and two sales racing for the last unit
//! end with one sale and one `InsufficientStock`. Only a wait longer than
//! `busy_timeout` surfaces as the retryable `DbError::Busy`. The guarded
//! decrement stays as a second line against oversell.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime, SubsecRound};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use cantina_core::validation::validate_cart_quantity;
use cantina_core::{Cart, CoreError, Money, SaleHeader, ValidationError};

use crate::error::{DbError, DbResult};
use crate::repository::ledger::LedgerRepository;

/// A cart line priced inside the sale transaction.
#[derive(Debug)]
struct PricedLine {
    product_id: i64,
    quantity: i64,
    subtotal: Money,
}

/// Units one product must give up for the whole cart.
#[derive(Debug)]
struct Demand {
    product_id: i64,
    code: String,
    /// Price read inside the transaction.
    unit_price: Money,
    available: i64,
    requested: i64,
}

/// The checkout engine.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
}

impl SaleEngine {
    pub fn new(pool: SqlitePool) -> Self {
        SaleEngine { pool }
    }

    /// Records a sale stamped with the local clock, to the second.
    ///
    /// ## Arguments
    /// * `cart` - lines to sell; repeated codes are allowed
    /// * `payment_method` - free text, e.g. "Efectivo"
    /// * `customer` - optional; blank is stored as absent
    ///
    /// ## Returns
    /// The new sale id.
    pub async fn record_sale(
        &self,
        cart: &Cart,
        payment_method: &str,
        customer: Option<&str>,
    ) -> DbResult<i64> {
        let sold_at = Local::now().naive_local().trunc_subsecs(0);
        self.record_sale_at(cart, payment_method, customer, sold_at)
            .await
    }

    /// Records a sale with an explicit timestamp.
    pub async fn record_sale_at(
        &self,
        cart: &Cart,
        payment_method: &str,
        customer: Option<&str>,
        sold_at: NaiveDateTime,
    ) -> DbResult<i64> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        for line in cart.lines() {
            validate_cart_quantity(line.quantity)?;
        }

        let payment_method = payment_method.trim();
        if payment_method.is_empty() {
            return Err(ValidationError::Required {
                field: "payment_method".to_string(),
            }
            .into());
        }
        let customer = customer
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        debug!(lines = cart.len(), payment_method, "Recording sale");

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let result = Self::write_sale(&mut tx, cart, payment_method, customer, sold_at).await;

        let sale_id = match result {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "Sale rejected, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(err);
            }
        };

        tx.commit().await.map_err(|e| match DbError::from(e) {
            busy @ DbError::Busy(_) => busy,
            other => DbError::TransactionFailed(other.to_string()),
        })?;

        info!(sale_id, lines = cart.len(), "Sale committed");
        Ok(sale_id)
    }

    /// Everything between BEGIN and COMMIT.
    async fn write_sale(
        conn: &mut SqliteConnection,
        cart: &Cart,
        payment_method: &str,
        customer: Option<String>,
        sold_at: NaiveDateTime,
    ) -> DbResult<i64> {
        let mut demands: Vec<Demand> = Vec::new();
        let mut index_by_code: HashMap<&str, usize> = HashMap::new();
        let mut priced = Vec::with_capacity(cart.len());

        for line in cart.lines() {
            let idx = match index_by_code.get(line.code.as_str()) {
                Some(&idx) => idx,
                None => {
                    let row: Option<(i64, i64, i64)> = sqlx::query_as(
                        "SELECT id, stock, price_cents FROM products WHERE code = ?1",
                    )
                    .bind(&line.code)
                    .fetch_optional(&mut *conn)
                    .await?;

                    let Some((product_id, stock, price_cents)) = row else {
                        return Err(CoreError::ProductNotFound(line.code.clone()).into());
                    };

                    demands.push(Demand {
                        product_id,
                        code: line.code.clone(),
                        unit_price: Money::from_cents(price_cents),
                        available: stock,
                        requested: 0,
                    });
                    index_by_code.insert(line.code.as_str(), demands.len() - 1);
                    demands.len() - 1
                }
            };

            let demand = &mut demands[idx];
            demand.requested += line.quantity;
            Self::check_stock(demand)?;

            priced.push(PricedLine {
                product_id: demand.product_id,
                quantity: line.quantity,
                subtotal: demand.unit_price * line.quantity,
            });
        }

        let total: Money = priced.iter().map(|p| p.subtotal).sum();

        let header = SaleHeader {
            sold_at,
            customer,
            payment_method: payment_method.to_string(),
            total_cents: total.cents(),
        };
        let sale_id = LedgerRepository::insert_sale(conn, &header).await?;

        for line in &priced {
            LedgerRepository::insert_line_item(
                conn,
                sale_id,
                line.product_id,
                line.quantity,
                line.subtotal.cents(),
            )
            .await?;
        }

        for demand in &demands {
            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
            )
            .bind(demand.product_id)
            .bind(demand.requested)
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CoreError::InsufficientStock {
                    code: demand.code.clone(),
                    available: demand.available,
                    requested: demand.requested,
                }
                .into());
            }
        }

        debug!(sale_id, total_cents = total.cents(), "Sale written");
        Ok(sale_id)
    }

    fn check_stock(demand: &Demand) -> DbResult<()> {
        if demand.requested > demand.available {
            return Err(CoreError::InsufficientStock {
                code: demand.code.clone(),
                available: demand.available,
                requested: demand.requested,
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use cantina_core::{CartLine, Category, Product};

    async fn db_with(products: &[(&str, i64, i64)]) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (code, stock, price_cents) in products {
            db.catalog()
                .add(&Product {
                    code: code.to_string(),
                    name: format!("Producto {code}"),
                    category: Category::Gaseosa,
                    size: "500ml".to_string(),
                    brand: "Marca".to_string(),
                    stock: *stock,
                    price_cents: *price_cents,
                })
                .await
                .unwrap();
        }
        db
    }

    async fn stock_of(db: &Database, code: &str) -> i64 {
        db.catalog().get_by_code(code).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_totals() {
        let db = db_with(&[("C100", 10, 10_000)]).await;
        let mut cart = Cart::new();
        cart.add("C100", 3).unwrap();

        let id = db.sales().record_sale(&cart, "Efectivo", None).await.unwrap();

        assert_eq!(stock_of(&db, "C100").await, 7);
        let record = db.ledger().get_sale(id).await.unwrap().unwrap();
        assert_eq!(record.sale.total_cents, 30_000);
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].quantity, 3);
        assert_eq!(record.items[0].subtotal_cents, 30_000);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let db = db_with(&[]).await;
        let err = db
            .sales()
            .record_sale(&Cart::new(), "Efectivo", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let db = db_with(&[("C100", 10, 10_000)]).await;
        let cart = Cart::from(vec![CartLine::new("C100", 0)]);

        let err = db
            .sales()
            .record_sale(&cart, "Efectivo", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(stock_of(&db, "C100").await, 10);
    }

    #[tokio::test]
    async fn test_unknown_code_rolls_back() {
        let db = db_with(&[("C100", 10, 10_000)]).await;
        let cart = Cart::from(vec![CartLine::new("C100", 1), CartLine::new("NOPE", 1)]);

        let err = db
            .sales()
            .record_sale(&cart, "Efectivo", None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(ref c)) if c == "NOPE"));
        assert_eq!(stock_of(&db, "C100").await, 10);
        assert_eq!(db.ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_reports_numbers() {
        let db = db_with(&[("C100", 2, 10_000)]).await;
        let cart = Cart::from(vec![CartLine::new("C100", 5)]);

        let err = db
            .sales()
            .record_sale(&cart, "Efectivo", None)
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                code,
                available,
                requested,
            }) => {
                assert_eq!(code, "C100");
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stock_of(&db, "C100").await, 2);
    }

    #[tokio::test]
    async fn test_repeated_code_checks_combined_demand() {
        let db = db_with(&[("C100", 4, 1_000)]).await;

        let over = Cart::from(vec![CartLine::new("C100", 3), CartLine::new("C100", 2)]);
        let err = db
            .sales()
            .record_sale(&over, "Efectivo", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { requested: 5, .. })
        ));
        assert_eq!(stock_of(&db, "C100").await, 4);

        let fits = Cart::from(vec![CartLine::new("C100", 3), CartLine::new("C100", 1)]);
        let id = db
            .sales()
            .record_sale(&fits, "Efectivo", None)
            .await
            .unwrap();
        let record = db.ledger().get_sale(id).await.unwrap().unwrap();

        assert_eq!(record.items.len(), 2);
        assert_eq!(record.sale.total_cents, 4_000);
        assert_eq!(stock_of(&db, "C100").await, 0);
    }

    #[tokio::test]
    async fn test_blank_customer_stored_as_absent() {
        let db = db_with(&[("C100", 10, 500)]).await;
        let cart = Cart::from(vec![CartLine::new("C100", 1)]);

        let anon = db
            .sales()
            .record_sale(&cart, "Efectivo", Some("   "))
            .await
            .unwrap();
        let named = db
            .sales()
            .record_sale(&cart, "Transferencia", Some(" Ana "))
            .await
            .unwrap();

        let ledger = db.ledger();
        assert_eq!(ledger.get_header(anon).await.unwrap().unwrap().customer, None);
        assert_eq!(
            ledger.get_header(named).await.unwrap().unwrap().customer,
            Some("Ana".to_string())
        );
    }

    #[tokio::test]
    async fn test_blank_payment_method_rejected() {
        let db = db_with(&[("C100", 10, 500)]).await;
        let cart = Cart::from(vec![CartLine::new("C100", 1)]);

        let err = db.sales().record_sale(&cart, " ", None).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sale_ids_increase() {
        let db = db_with(&[("C100", 10, 500)]).await;
        let cart = Cart::from(vec![CartLine::new("C100", 1)]);

        let first = db.sales().record_sale(&cart, "Efectivo", None).await.unwrap();
        let second = db.sales().record_sale(&cart, "Efectivo", None).await.unwrap();
        assert!(second > first);
    }
}
