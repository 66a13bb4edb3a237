//! # Report Repository
//!
//! Read-only aggregates over the sale ledger for the dashboard.
//!
//! ## Degraded Results
//! Reports are best-effort: a storage failure is logged at `warn` and the
//! query returns zero, `None` or an empty list instead of an error.
//!
//! ## Month Filter
//! Every monthly query filters with the half-open range from
//! [`ReportMonth::start_bound`] / [`ReportMonth::end_bound`]:
//!
//! ```sql
//! WHERE s.sold_at >= '2024-03-01' AND s.sold_at < '2024-04-01'
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use cantina_core::{
    CategorySales, DailySales, DayTotal, MonthComparison, MonthlyOverview, ProductRanking,
    ReportMonth,
};

use crate::error::{DbError, DbResult};

/// Logs a failed report query and substitutes `fallback`.
fn degrade<T>(report: &str, result: DbResult<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(report, error = %err, "Report query failed, returning empty result");
            fallback
        }
    }
}

/// Reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Total sold on `day`, in cents.
    pub async fn total_for_day(&self, day: NaiveDate) -> i64 {
        let result: DbResult<i64> = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM sales WHERE DATE(sold_at) = ?1",
        )
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from);

        degrade("total_for_day", result, 0)
    }

    /// Total sold in `month`, in cents.
    pub async fn total_for_month(&self, month: ReportMonth) -> i64 {
        let result: DbResult<i64> = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM sales \
             WHERE sold_at >= ?1 AND sold_at < ?2",
        )
        .bind(month.start_bound())
        .bind(month.end_bound())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from);

        degrade("total_for_month", result, 0)
    }

    /// Number of sales in `month`.
    pub async fn count_for_month(&self, month: ReportMonth) -> i64 {
        let result: DbResult<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sales WHERE sold_at >= ?1 AND sold_at < ?2",
        )
        .bind(month.start_bound())
        .bind(month.end_bound())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from);

        degrade("count_for_month", result, 0)
    }

    /// Day of `month` with the highest total. Ties go to whichever day the
    /// query returns first.
    pub async fn best_day(&self, month: ReportMonth) -> Option<DayTotal> {
        let result = self.extreme_day(month, "DESC").await;
        degrade("best_day", result, None)
    }

    /// Day of `month` with the lowest total among days that had sales.
    pub async fn worst_day(&self, month: ReportMonth) -> Option<DayTotal> {
        let result = self.extreme_day(month, "ASC").await;
        degrade("worst_day", result, None)
    }

    async fn extreme_day(&self, month: ReportMonth, order: &str) -> DbResult<Option<DayTotal>> {
        let query = format!(
            "SELECT DATE(sold_at) AS day, SUM(total_cents) AS total_cents \
             FROM sales \
             WHERE sold_at >= ?1 AND sold_at < ?2 \
             GROUP BY DATE(sold_at) \
             ORDER BY total_cents {order} \
             LIMIT 1"
        );

        let day = sqlx::query_as::<_, DayTotal>(&query)
            .bind(month.start_bound())
            .bind(month.end_bound())
            .fetch_optional(&self.pool)
            .await?;

        Ok(day)
    }

    /// Best sellers of `month` by units, at most `limit` entries.
    ///
    /// Grouped by product name as it reads in the catalog today, so two
    /// products with the same name are counted as one. Lines of deleted
    /// products are left out.
    pub async fn top_products(&self, month: ReportMonth, limit: u32) -> Vec<ProductRanking> {
        debug!(month = %month, limit, "Loading top products");

        let result = sqlx::query_as::<_, ProductRanking>(
            "SELECT \
                 p.name AS name, \
                 SUM(si.quantity) AS quantity, \
                 SUM(si.subtotal_cents) AS revenue_cents \
             FROM sale_items si \
             JOIN sales s ON s.id = si.sale_id \
             JOIN products p ON p.id = si.product_id \
             WHERE s.sold_at >= ?1 AND s.sold_at < ?2 \
             GROUP BY p.name \
             ORDER BY quantity DESC, revenue_cents DESC \
             LIMIT ?3",
        )
        .bind(month.start_bound())
        .bind(month.end_bound())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from);

        degrade("top_products", result, Vec::new())
    }

    /// Units and revenue per category in `month`, highest revenue first.
    pub async fn by_category(&self, month: ReportMonth) -> Vec<CategorySales> {
        let result = sqlx::query_as::<_, CategorySales>(
            "SELECT \
                 p.category AS category, \
                 SUM(si.quantity) AS quantity, \
                 SUM(si.subtotal_cents) AS revenue_cents \
             FROM sale_items si \
             JOIN sales s ON s.id = si.sale_id \
             JOIN products p ON p.id = si.product_id \
             WHERE s.sold_at >= ?1 AND s.sold_at < ?2 \
             GROUP BY p.category \
             ORDER BY revenue_cents DESC",
        )
        .bind(month.start_bound())
        .bind(month.end_bound())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from);

        degrade("by_category", result, Vec::new())
    }

    /// Sale count and total per day of `month`, newest day first.
    pub async fn daily_breakdown(&self, month: ReportMonth) -> Vec<DailySales> {
        let result = sqlx::query_as::<_, DailySales>(
            "SELECT \
                 DATE(sold_at) AS day, \
                 COUNT(*) AS sale_count, \
                 SUM(total_cents) AS total_cents \
             FROM sales \
             WHERE sold_at >= ?1 AND sold_at < ?2 \
             GROUP BY DATE(sold_at) \
             ORDER BY day DESC",
        )
        .bind(month.start_bound())
        .bind(month.end_bound())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from);

        degrade("daily_breakdown", result, Vec::new())
    }

    /// Total, count and average ticket for `month`.
    pub async fn monthly_overview(&self, month: ReportMonth) -> MonthlyOverview {
        let result: DbResult<(i64, i64)> = sqlx::query_as(
            "SELECT COALESCE(SUM(total_cents), 0), COUNT(*) FROM sales \
             WHERE sold_at >= ?1 AND sold_at < ?2",
        )
        .bind(month.start_bound())
        .bind(month.end_bound())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from);

        let (total_cents, sale_count) = degrade("monthly_overview", result, (0, 0));
        MonthlyOverview {
            month,
            total_cents,
            sale_count,
        }
    }

    /// `month` against the calendar month before it.
    pub async fn month_comparison(&self, month: ReportMonth) -> MonthComparison {
        let current_cents = self.total_for_month(month).await;
        let previous_cents = self.total_for_month(month.previous()).await;

        MonthComparison {
            month,
            current_cents,
            previous_cents,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use cantina_core::{Cart, CartLine, Category, Product};
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn month(s: &str) -> ReportMonth {
        s.parse().unwrap()
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (code, name, category, price_cents) in [
            ("G001", "Cola", Category::Gaseosa, 10_000),
            ("G002", "Lima", Category::Gaseosa, 5_000),
            ("V001", "Malbec", Category::Vino, 20_000),
        ] {
            db.catalog()
                .add(&Product {
                    code: code.to_string(),
                    name: name.to_string(),
                    category,
                    size: "1L".to_string(),
                    brand: "Marca".to_string(),
                    stock: 100,
                    price_cents,
                })
                .await
                .unwrap();
        }
        db
    }

    async fn sell(db: &Database, lines: &[(&str, i64)], when: &str) {
        let cart = Cart::from(
            lines
                .iter()
                .map(|(code, qty)| CartLine::new(*code, *qty))
                .collect::<Vec<_>>(),
        );
        db.sales()
            .record_sale_at(&cart, "Efectivo", None, at(when))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_ledger_reports_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reports = db.reports();
        let march = month("2024-03");

        assert_eq!(reports.total_for_month(march).await, 0);
        assert_eq!(reports.count_for_month(march).await, 0);
        assert_eq!(
            reports
                .total_for_day(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
                .await,
            0
        );
        assert!(reports.best_day(march).await.is_none());
        assert!(reports.top_products(march, 5).await.is_empty());
        assert!(reports.daily_breakdown(march).await.is_empty());
        assert!(reports.monthly_overview(march).await.average_ticket().is_zero());
    }

    #[tokio::test]
    async fn test_month_bounds_exclude_neighbours() {
        let db = seeded().await;
        sell(&db, &[("G002", 1)], "2024-02-29 23:59:59").await;
        sell(&db, &[("G001", 1)], "2024-03-01 00:00:00").await;
        sell(&db, &[("G001", 2)], "2024-03-31 23:59:59").await;
        sell(&db, &[("G002", 1)], "2024-04-01 00:00:00").await;

        let reports = db.reports();
        assert_eq!(reports.total_for_month(month("2024-03")).await, 30_000);
        assert_eq!(reports.count_for_month(month("2024-03")).await, 2);
        assert_eq!(reports.count_for_month(month("2024-02")).await, 1);
    }

    #[tokio::test]
    async fn test_best_and_worst_day() {
        let db = seeded().await;
        sell(&db, &[("G001", 1)], "2024-03-05 10:00:00").await;
        sell(&db, &[("G001", 1)], "2024-03-05 18:00:00").await;
        sell(&db, &[("V001", 2)], "2024-03-09 12:00:00").await;
        sell(&db, &[("G002", 1)], "2024-03-20 12:00:00").await;

        let reports = db.reports();
        let best = reports.best_day(month("2024-03")).await.unwrap();
        assert_eq!(best.day, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(best.total_cents, 40_000);

        let worst = reports.worst_day(month("2024-03")).await.unwrap();
        assert_eq!(worst.day, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assert_eq!(worst.total_cents, 5_000);

        assert_eq!(
            reports
                .total_for_day(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
                .await,
            20_000
        );
    }

    #[tokio::test]
    async fn test_top_products_and_categories() {
        let db = seeded().await;
        sell(&db, &[("G001", 3), ("V001", 1)], "2024-03-05 10:00:00").await;
        sell(&db, &[("G002", 5)], "2024-03-06 10:00:00").await;
        sell(&db, &[("G001", 1)], "2024-03-07 10:00:00").await;

        let reports = db.reports();
        let top = reports.top_products(month("2024-03"), 2).await;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Lima");
        assert_eq!(top[0].quantity, 5);
        assert_eq!(top[1].name, "Cola");
        assert_eq!(top[1].quantity, 4);
        assert_eq!(top[1].revenue_cents, 40_000);

        let categories = reports.by_category(month("2024-03")).await;
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category, Category::Gaseosa);
        assert_eq!(categories[0].quantity, 9);
        assert_eq!(categories[0].revenue_cents, 65_000);
        assert_eq!(categories[1].category, Category::Vino);
        assert_eq!(categories[1].revenue_cents, 20_000);
    }

    #[tokio::test]
    async fn test_daily_breakdown_newest_first() {
        let db = seeded().await;
        sell(&db, &[("G001", 1)], "2024-03-05 10:00:00").await;
        sell(&db, &[("G001", 2)], "2024-03-05 11:00:00").await;
        sell(&db, &[("G002", 1)], "2024-03-12 10:00:00").await;

        let days = db.reports().daily_breakdown(month("2024-03")).await;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        assert_eq!(days[1].sale_count, 2);
        assert_eq!(days[1].total_cents, 30_000);
        assert_eq!(days[1].average_ticket().cents(), 15_000);
    }

    #[tokio::test]
    async fn test_month_comparison() {
        let db = seeded().await;
        sell(&db, &[("G001", 1)], "2024-02-10 10:00:00").await;
        sell(&db, &[("G001", 1), ("G002", 1)], "2024-03-10 10:00:00").await;

        let cmp = db.reports().month_comparison(month("2024-03")).await;
        assert_eq!(cmp.current_cents, 15_000);
        assert_eq!(cmp.previous_cents, 10_000);
        assert_eq!(cmp.difference().cents(), 5_000);
        assert!((cmp.percent_change() - 50.0).abs() < 1e-9);

        let first = db.reports().month_comparison(month("2024-02")).await;
        assert_eq!(first.previous_cents, 0);
        assert_eq!(first.percent_change(), 0.0);
    }

    #[tokio::test]
    async fn test_storage_failure_degrades_to_empty() {
        let db = seeded().await;
        sell(&db, &[("G001", 1)], "2024-03-05 10:00:00").await;
        db.close().await;

        let reports = db.reports();
        assert_eq!(reports.total_for_month(month("2024-03")).await, 0);
        assert!(reports.daily_breakdown(month("2024-03")).await.is_empty());
        assert!(reports.best_day(month("2024-03")).await.is_none());
    }
}
