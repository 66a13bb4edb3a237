//! How committed sales read after the catalog changes underneath them.
//!
//! Line items store only the product id, quantity and subtotal. Everything
//! else on a ticket is joined from the catalog when it is read.

mod common;

use chrono::NaiveDateTime;

use cantina_core::{Category, ReportMonth};
use common::{cart, memory_db, product};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[tokio::test]
async fn renamed_product_renames_old_tickets() {
    let db = memory_db().await;
    db.catalog()
        .add(&product("C1", "Cola", Category::Gaseosa, 10, 10_000))
        .await
        .unwrap();
    let sale_id = db
        .sales()
        .record_sale(&cart(&[("C1", 2)]), "Efectivo", None)
        .await
        .unwrap();

    let mut renamed = product("C1-NEW", "Cola Zero", Category::Gaseosa, 8, 12_000);
    renamed.size = "1L".to_string();
    assert!(db.catalog().update("C1", &renamed).await.unwrap());

    let ticket = db.ledger().get_sale(sale_id).await.unwrap().unwrap();
    let line = &ticket.items[0];
    assert_eq!(line.name.as_deref(), Some("Cola Zero"));
    assert_eq!(line.code.as_deref(), Some("C1-NEW"));
    assert_eq!(line.size.as_deref(), Some("1L"));
    assert_eq!(line.current_price_cents, Some(12_000));
    // The charged amount does not move.
    assert_eq!(line.subtotal_cents, 20_000);
    assert_eq!(line.unit_price().cents(), 10_000);
}

#[tokio::test]
async fn deleted_product_leaves_orphaned_line() {
    let db = memory_db().await;
    db.catalog()
        .add(&product("C1", "Cola", Category::Gaseosa, 10, 10_000))
        .await
        .unwrap();
    db.catalog()
        .add(&product("L1", "Lima", Category::Gaseosa, 10, 5_000))
        .await
        .unwrap();
    let sale_id = db
        .sales()
        .record_sale(&cart(&[("C1", 1), ("L1", 3)]), "Efectivo", None)
        .await
        .unwrap();

    assert!(db.catalog().remove("C1").await.unwrap());
    // Re-adding the code creates a new row with a new id.
    db.catalog()
        .add(&product("C1", "Cola Nueva", Category::Gaseosa, 5, 11_000))
        .await
        .unwrap();

    let ticket = db.ledger().get_sale(sale_id).await.unwrap().unwrap();
    assert_eq!(ticket.items.len(), 2);

    let orphan = &ticket.items[0];
    assert!(orphan.is_orphaned());
    assert_eq!(orphan.name, None);
    assert_eq!(orphan.category, None);
    assert_eq!(orphan.subtotal_cents, 10_000);

    assert!(!ticket.items[1].is_orphaned());
    assert_eq!(ticket.items_total(), ticket.total());
}

#[tokio::test]
async fn top_products_merges_same_name_and_follows_renames() {
    let db = memory_db().await;
    let catalog = db.catalog();
    catalog
        .add(&product("A1", "Agua", Category::Otros, 20, 1_000))
        .await
        .unwrap();
    catalog
        .add(&product("A2", "Agua", Category::Otros, 20, 1_500))
        .await
        .unwrap();
    catalog
        .add(&product("C1", "Cola", Category::Gaseosa, 20, 2_000))
        .await
        .unwrap();

    let sales = db.sales();
    sales
        .record_sale_at(&cart(&[("A1", 2), ("C1", 3)]), "Efectivo", None, at("2024-06-03 12:00:00"))
        .await
        .unwrap();
    sales
        .record_sale_at(&cart(&[("A2", 2)]), "Efectivo", None, at("2024-06-04 12:00:00"))
        .await
        .unwrap();

    let june: ReportMonth = "2024-06".parse().unwrap();
    let top = db.reports().top_products(june, 10).await;
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].name, "Agua");
    assert_eq!(top[0].quantity, 4);
    assert_eq!(top[0].revenue_cents, 5_000);

    // Recategorizing moves past revenue to the new category.
    let mut cola = catalog.get_by_code("C1").await.unwrap().unwrap();
    cola.category = Category::Energizante;
    assert!(catalog.update("C1", &cola).await.unwrap());

    let categories = db.reports().by_category(june).await;
    assert!(categories.iter().any(|c| c.category == Category::Energizante && c.quantity == 3));
    assert!(categories.iter().all(|c| c.category != Category::Gaseosa));
}
