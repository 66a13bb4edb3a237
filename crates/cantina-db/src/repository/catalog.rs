//! # Catalog Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD keyed by product code (code rename supported on update)
//! - Substring search over code, name, brand and category
//! - Inventory summary and low-stock list
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Catalog Search Works                             │
//! │                                                                         │
//! │  User types: "co_a"                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  escape_like()  →  "%co\_a%"    ('%' and '_' match literally)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  code LIKE ?1 OR name LIKE ?1 OR brand LIKE ?1 OR category LIKE ?1     │
//! │       │          (SQLite LIKE folds ASCII case only)                    │
//! │       ▼                                                                 │
//! │  ORDER BY name                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use cantina_core::validation::normalize_search_term;
use cantina_core::{CoreError, InventorySummary, Product};

use crate::error::{DbError, DbResult};

/// SQLite rejects LIKE patterns longer than this many bytes
/// (`SQLITE_MAX_LIKE_PATTERN_LENGTH`).
const LIKE_PATTERN_LIMIT: usize = 50_000;

/// Column list for `products` queries, in `Product` field order.
const COLUMNS: &str = "code, name, category, size, brand, stock, price_cents";

/// Escapes LIKE wildcards (and the escape char itself) for `ESCAPE '\'`.
pub(crate) fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            _ => out.push(ch),
        }
    }
    out
}

/// Maps a UNIQUE(code) failure to the domain error for `code`.
fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => CoreError::DuplicateCode(code.to_string()).into(),
        other => other,
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = db.catalog();
///
/// catalog.add(&product).await?;
/// let found = catalog.get_by_code("7790895000997").await?;
/// let colas = catalog.search("cola").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
    low_stock_threshold: i64,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool, low_stock_threshold: i64) -> Self {
        CatalogRepository {
            pool,
            low_stock_threshold,
        }
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::Domain(CoreError::DuplicateCode))` - code already
    ///   exists; the existing row is untouched
    pub async fn add(&self, product: &Product) -> DbResult<()> {
        debug!(code = %product.code, "Adding product");

        sqlx::query(
            "INSERT INTO products (code, name, category, size, brand, stock, price_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.category)
        .bind(&product.size)
        .bind(&product.brand)
        .bind(product.stock)
        .bind(product.price_cents)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &product.code))?;

        Ok(())
    }

    /// Overwrites the product stored under `original_code`, code included.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - No product has `original_code`; nothing changed
    /// * `Err(DbError::Domain(CoreError::DuplicateCode))` - the new code
    ///   belongs to another product
    pub async fn update(&self, original_code: &str, product: &Product) -> DbResult<bool> {
        debug!(original_code = %original_code, code = %product.code, "Updating product");

        let result = sqlx::query(
            "UPDATE products SET \
                 code = ?2, name = ?3, category = ?4, size = ?5, \
                 brand = ?6, stock = ?7, price_cents = ?8 \
             WHERE code = ?1",
        )
        .bind(original_code)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.category)
        .bind(&product.size)
        .bind(&product.brand)
        .bind(product.stock)
        .bind(product.price_cents)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &product.code))?;

        if result.rows_affected() == 0 {
            debug!(original_code = %original_code, "Update matched no product");
            return Ok(false);
        }

        Ok(true)
    }

    /// Deletes the product with `code`. Returns whether a row was removed.
    ///
    /// Past sales keep their line items; see `LedgerRepository::get_sale`
    /// for how those read afterwards.
    pub async fn remove(&self, code: &str) -> DbResult<bool> {
        debug!(code = %code, "Removing product");

        let result = sqlx::query("DELETE FROM products WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Gets a product by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE code = ?1");

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// All products, by name ascending.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let query = format!("SELECT {COLUMNS} FROM products ORDER BY name, code");

        let products = sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Products whose code, name, brand or category contains `term`,
    /// ignoring ASCII case, by name. A blank term lists everything; a term
    /// too long for SQLite's LIKE matches nothing.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Product>> {
        let term = normalize_search_term(term);

        debug!(term_len = term.len(), "Searching products");

        if term.is_empty() {
            return self.list_all().await;
        }

        let pattern = format!("%{}%", escape_like(&term));
        if pattern.len() > LIKE_PATTERN_LIMIT {
            return Ok(Vec::new());
        }
        let query = format!(
            r"SELECT {COLUMNS} FROM products
              WHERE code LIKE ?1 ESCAPE '\'
                 OR name LIKE ?1 ESCAPE '\'
                 OR brand LIKE ?1 ESCAPE '\'
                 OR category LIKE ?1 ESCAPE '\'
              ORDER BY name, code"
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Counts, stock units and value across the whole catalog.
    ///
    /// "Low stock" uses the threshold this repository was built with.
    pub async fn summary(&self) -> DbResult<InventorySummary> {
        let (total_products, total_stock, inventory_value_cents, out_of_stock, low_stock): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT \
                 COUNT(*), \
                 COALESCE(SUM(stock), 0), \
                 COALESCE(SUM(stock * price_cents), 0), \
                 COALESCE(SUM(CASE WHEN stock <= 0 THEN 1 ELSE 0 END), 0), \
                 COALESCE(SUM(CASE WHEN stock > 0 AND stock <= ?1 THEN 1 ELSE 0 END), 0) \
             FROM products",
        )
        .bind(self.low_stock_threshold)
        .fetch_one(&self.pool)
        .await?;

        Ok(InventorySummary {
            total_products,
            total_stock,
            inventory_value_cents,
            out_of_stock,
            low_stock,
        })
    }

    /// Products with `0 < stock <= threshold`, lowest stock first.
    pub async fn low_stock_list(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let query = format!(
            "SELECT {COLUMNS} FROM products \
             WHERE stock > 0 AND stock <= ?1 \
             ORDER BY stock ASC, name ASC"
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use cantina_core::Category;

    fn product(code: &str, name: &str, category: Category, stock: i64, price_cents: i64) -> Product {
        Product {
            code: code.to_string(),
            name: name.to_string(),
            category,
            size: "500ml".to_string(),
            brand: "Marca".to_string(),
            stock,
            price_cents,
        }
    }

    async fn catalog() -> CatalogRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().catalog()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\"), "c:\\\\");
        assert_eq!(escape_like("cola"), "cola");
    }

    #[tokio::test]
    async fn test_add_then_get_returns_same_product() {
        let catalog = catalog().await;
        let cola = product("C100", "Cola", Category::Gaseosa, 10, 10_000);

        catalog.add(&cola).await.unwrap();

        assert_eq!(catalog.get_by_code("C100").await.unwrap(), Some(cola));
        assert_eq!(catalog.get_by_code("NOPE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_code_leaves_existing_row() {
        let catalog = catalog().await;
        let cola = product("C100", "Cola", Category::Gaseosa, 10, 10_000);
        catalog.add(&cola).await.unwrap();

        let impostor = product("C100", "Other", Category::Vino, 1, 1);
        let err = catalog.add(&impostor).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::DuplicateCode(ref code)) if code == "C100"
        ));
        assert_eq!(catalog.get_by_code("C100").await.unwrap(), Some(cola));
    }

    #[tokio::test]
    async fn test_update_renames_code() {
        let catalog = catalog().await;
        catalog
            .add(&product("C100", "Cola", Category::Gaseosa, 10, 10_000))
            .await
            .unwrap();

        let renamed = product("C200", "Cola Zero", Category::Gaseosa, 12, 11_000);
        assert!(catalog.update("C100", &renamed).await.unwrap());

        assert_eq!(catalog.get_by_code("C100").await.unwrap(), None);
        assert_eq!(catalog.get_by_code("C200").await.unwrap(), Some(renamed));
    }

    #[tokio::test]
    async fn test_update_missing_code_is_noop() {
        let catalog = catalog().await;
        let ghost = product("C999", "Ghost", Category::Otros, 1, 1);

        assert!(!catalog.update("C999", &ghost).await.unwrap());
        assert_eq!(catalog.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_onto_taken_code_fails() {
        let catalog = catalog().await;
        catalog
            .add(&product("C100", "Cola", Category::Gaseosa, 10, 10_000))
            .await
            .unwrap();
        catalog
            .add(&product("L100", "Limon", Category::Gaseosa, 5, 9_000))
            .await
            .unwrap();

        let clash = product("C100", "Limon", Category::Gaseosa, 5, 9_000);
        let err = catalog.update("L100", &clash).await.unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::DuplicateCode(_))));
        assert!(catalog.get_by_code("L100").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove() {
        let catalog = catalog().await;
        catalog
            .add(&product("C100", "Cola", Category::Gaseosa, 10, 10_000))
            .await
            .unwrap();

        assert!(catalog.remove("C100").await.unwrap());
        assert!(!catalog.remove("C100").await.unwrap());
        assert_eq!(catalog.get_by_code("C100").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_all_orders_by_name() {
        let catalog = catalog().await;
        for (code, name) in [("Z01", "Zumo"), ("A01", "Agua"), ("M01", "Malbec")] {
            catalog
                .add(&product(code, name, Category::Otros, 1, 100))
                .await
                .unwrap();
        }

        let names: Vec<String> = catalog
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Agua", "Malbec", "Zumo"]);
    }

    #[tokio::test]
    async fn test_search_matches_any_field_case_insensitively() {
        let catalog = catalog().await;
        catalog
            .add(&product("C100", "Cola", Category::Gaseosa, 10, 10_000))
            .await
            .unwrap();
        catalog
            .add(&product("V100", "Malbec", Category::Vino, 3, 50_000))
            .await
            .unwrap();

        assert_eq!(catalog.search("COLA").await.unwrap().len(), 1);
        assert_eq!(catalog.search("v10").await.unwrap().len(), 1);
        assert_eq!(catalog.search("vino").await.unwrap().len(), 1);
        assert_eq!(catalog.search("marca").await.unwrap().len(), 2);
        assert_eq!(catalog.search("  ").await.unwrap().len(), 2);
        assert!(catalog.search("cerveza").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let catalog = catalog().await;
        catalog
            .add(&product("P_01", "Promo 50%", Category::Promo, 1, 100))
            .await
            .unwrap();
        catalog
            .add(&product("PX01", "Promo 500", Category::Promo, 1, 100))
            .await
            .unwrap();

        let hits = catalog.search("50%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "P_01");

        let hits = catalog.search("p_0").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "P_01");
    }

    #[tokio::test]
    async fn test_long_search_term_returns_empty() {
        let catalog = catalog().await;
        catalog
            .add(&product("C100", "Cola", Category::Gaseosa, 10, 10_000))
            .await
            .unwrap();

        assert!(catalog.search(&"cola".repeat(40)).await.unwrap().is_empty());
        assert!(catalog.search(&"x".repeat(60_000)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_partitions_stock_levels() {
        let catalog = catalog().await;
        catalog
            .add(&product("A01", "Agotado", Category::Otros, 0, 1_000))
            .await
            .unwrap();
        catalog
            .add(&product("B01", "Bajo", Category::Otros, 5, 2_000))
            .await
            .unwrap();
        catalog
            .add(&product("C01", "Colmado", Category::Otros, 6, 500))
            .await
            .unwrap();

        let summary = catalog.summary().await.unwrap();
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_stock, 11);
        assert_eq!(summary.inventory_value_cents, 5 * 2_000 + 6 * 500);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.low_stock, 1);
    }

    #[tokio::test]
    async fn test_summary_of_empty_catalog() {
        let summary = catalog().await.summary().await.unwrap();
        assert_eq!(summary, InventorySummary::default());
    }

    #[tokio::test]
    async fn test_low_stock_list_order() {
        let catalog = catalog().await;
        for (code, name, stock) in [
            ("A01", "Beta", 3),
            ("A02", "Alfa", 3),
            ("A03", "Gamma", 1),
            ("A04", "Delta", 0),
            ("A05", "Omega", 9),
        ] {
            catalog
                .add(&product(code, name, Category::Otros, stock, 100))
                .await
                .unwrap();
        }

        let names: Vec<String> = catalog
            .low_stock_list(5)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Gamma", "Alfa", "Beta"]);
    }
}
