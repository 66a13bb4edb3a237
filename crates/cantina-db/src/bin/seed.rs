//! # Seed Data Generator
//!
//! Populates the database with a beverage catalog and optional demo sales
//! for development.
//!
//! ## Usage
//! ```bash
//! # Generate up to 200 products (default)
//! cargo run -p cantina-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p cantina-db --bin seed -- --count 50
//!
//! # Specify database path and add 30 days of demo sales
//! cargo run -p cantina-db --bin seed -- --db ./data/cantina.db --sales 30
//! ```
//!
//! ## Generated Products
//! Every row goes through the same form validation the product screen uses,
//! so codes, sizes and prices always satisfy the catalog rules:
//! - Code: `{PREFIX}{INDEX:03}`, e.g. `GAS007`
//! - Name: `{Product} {Size}`
//! - Price: $800 - $48,000 depending on category and size
//! - Stock: 0 - 60

use chrono::{Duration, Local, NaiveTime};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cantina_core::validation::{validate_all_with, ProductForm};
use cantina_core::{Cart, Category, StoreSettings, PAYMENT_METHODS};
use cantina_db::{Database, DbConfig, DEFAULT_DB_PATH};

/// Products per category: (code prefix, category, brand, base price, names)
const CATALOG: &[(&str, Category, &str, i64, &[&str])] = &[
    (
        "GAS",
        Category::Gaseosa,
        "Coca-Cola",
        800,
        &["Coca-Cola", "Sprite", "Fanta Naranja", "Schweppes Pomelo"],
    ),
    (
        "ENE",
        Category::Energizante,
        "Monster",
        1_500,
        &["Monster Original", "Monster Ultra", "Red Bull", "Speed Unlimited"],
    ),
    (
        "VIN",
        Category::Vino,
        "Trapiche",
        4_500,
        &["Malbec Roble", "Cabernet Sauvignon", "Torrontés", "Rosado Dulce"],
    ),
    (
        "LIC",
        Category::Licor,
        "Cusenier",
        7_000,
        &["Licor de Café", "Licor de Menta", "Triple Sec", "Amaretto"],
    ),
    (
        "CER",
        Category::Cerveza,
        "Quilmes",
        1_200,
        &["Quilmes Clásica", "Stella Artois", "Patagonia Amber", "Corona"],
    ),
    (
        "APE",
        Category::Aperitivo,
        "Fernet Branca",
        6_000,
        &["Fernet Branca", "Campari", "Aperol", "Gancia"],
    ),
    (
        "OTR",
        Category::Otros,
        "Villavicencio",
        600,
        &["Agua Mineral", "Agua con Gas", "Jugo de Naranja", "Hielo"],
    ),
];

/// Size variants with a price multiplier in tenths
const SIZES: &[(&str, i64)] = &[
    ("354ml", 10),
    ("500ml", 12),
    ("1L", 18),
    ("1.5L", 24),
    ("2.25L", 30),
    ("Pack x6", 55),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut sale_days: i64 = 0;
    let mut db_path = String::from(DEFAULT_DB_PATH);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sale_days = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cantina POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -s, --sales <DAYS> Days of demo sales to record (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB_PATH})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, count, sale_days, "Seeding database");

    let settings = StoreSettings::from_env();
    let db = Database::with_settings(DbConfig::new(&db_path), settings.clone()).await?;

    // Check existing products
    let existing = db.catalog().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        println!("Database already has {existing} products. Delete the file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut codes = Vec::new();

    'outer: for (prefix, category, brand, base_price, names) in CATALOG {
        let mut index = 0;
        for name in names.iter() {
            for (size, multiplier) in SIZES {
                if codes.len() >= count {
                    break 'outer;
                }
                index += 1;

                let form = ProductForm {
                    code: format!("{prefix}{index:03}"),
                    name: format!("{name} {size}"),
                    category: category.to_string(),
                    size: size.to_string(),
                    brand: brand.to_string(),
                    quantity: ((codes.len() * 7) % 61).to_string(),
                    price: (base_price * multiplier / 10).to_string(),
                };

                let product = match validate_all_with(&form, &settings, 0) {
                    Ok(product) => product,
                    Err(err) => {
                        warn!(code = %form.code, error = %err, "Skipping invalid product");
                        continue;
                    }
                };

                if let Err(err) = db.catalog().add(&product).await {
                    warn!(code = %product.code, error = %err, "Failed to insert product");
                    continue;
                }
                codes.push(product.code);
            }
        }
    }

    info!(generated = codes.len(), elapsed = ?start.elapsed(), "Products generated");

    if sale_days > 0 && !codes.is_empty() {
        let recorded = seed_sales(&db, &codes, sale_days).await;
        info!(recorded, "Demo sales recorded");
    }

    let summary = db.catalog().summary().await?;
    println!("Seed complete!");
    println!("  Products:        {}", summary.total_products);
    println!("  Units in stock:  {}", summary.total_stock);
    println!("  Inventory value: {}", summary.inventory_value());
    println!("  Out of stock:    {}", summary.out_of_stock);
    println!("  Low stock:       {}", summary.low_stock);

    db.close().await;
    Ok(())
}

/// Records a few sales per day over the last `days` days. Sales that run
/// out of stock are skipped.
async fn seed_sales(db: &Database, codes: &[String], days: i64) -> usize {
    let today = Local::now().date_naive();
    let mut recorded = 0;

    for day in 0..days {
        let date = today - Duration::days(day);
        let per_day = 1 + (day % 4) as usize;

        for n in 0..per_day {
            let seed = (day as usize) * 31 + n * 7;
            let mut cart = Cart::new();
            for k in 0..=(seed % 3) {
                let code = &codes[(seed + k * 13) % codes.len()];
                if let Err(err) = cart.add(code.as_str(), 1 + (k as i64)) {
                    warn!(code = %code, error = %err, "Demo cart line skipped");
                }
            }

            let Some(time) = NaiveTime::from_hms_opt(10 + (n as u32 * 3) % 12, 15, 0) else {
                continue;
            };
            let method = PAYMENT_METHODS[seed % PAYMENT_METHODS.len()];

            match db
                .sales()
                .record_sale_at(&cart, method, None, date.and_time(time))
                .await
            {
                Ok(_) => recorded += 1,
                Err(err) => warn!(%date, error = %err, "Demo sale skipped"),
            }
        }
    }

    recorded
}

/// Initializes the tracing subscriber for structured logging.
///
/// Defaults to INFO with sqlx quieted; override with `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cantina=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
