//! Shared helpers for cantina-db integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cantina_core::{Cart, CartLine, Category, Product};
use cantina_db::{Database, DbConfig};

/// Fresh in-memory database with migrations applied.
pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// File-backed database under the temp dir, for tests that need more than
/// one pooled connection. Pair with [`remove_db_files`].
pub async fn file_db(max_connections: u32) -> (Database, PathBuf) {
    let path = std::env::temp_dir().join(format!("cantina-{}.db", uuid::Uuid::new_v4()));
    let config = DbConfig::new(&path)
        .max_connections(max_connections)
        .min_connections(1);
    let db = Database::new(config).await.expect("file database");
    (db, path)
}

/// Deletes a file database together with its WAL side files.
pub fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(PathBuf::from(file));
    }
}

pub fn product(code: &str, name: &str, category: Category, stock: i64, price_cents: i64) -> Product {
    Product {
        code: code.to_string(),
        name: name.to_string(),
        category,
        size: "500ml".to_string(),
        brand: "X".to_string(),
        stock,
        price_cents,
    }
}

pub fn cart(lines: &[(&str, i64)]) -> Cart {
    Cart::from(
        lines
            .iter()
            .map(|(code, qty)| CartLine::new(*code, *qty))
            .collect::<Vec<_>>(),
    )
}
