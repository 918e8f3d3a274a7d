use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{PriceHistoryEntry, TrackedProduct};
use crate::store::ProductStore;
use crate::utils::error::Result;

/// SQLite-backed product store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent schema bootstrap. Safe to call on every startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                subscriber_id INTEGER NOT NULL,
                name TEXT,
                current_price REAL,
                last_checked TEXT,
                created_at TEXT NOT NULL,
                UNIQUE(url, subscriber_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL REFERENCES products(id),
                price REAL NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_price_history_product ON price_history(product_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn product_id(&self, url: &str, subscriber_id: i64) -> Result<Option<i64>> {
        let id: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM products WHERE url = ? AND subscriber_id = ?")
                .bind(url)
                .bind(subscriber_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(id.map(|(id,)| id))
    }
}

#[async_trait]
impl ProductStore for SqliteStore {
    async fn add_product(&self, url: &str, subscriber_id: i64, name: Option<&str>) -> Result<i64> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO products (url, subscriber_id, name, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(url)
        .bind(subscriber_id)
        .bind(name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = self.product_id(url, subscriber_id).await?;
        id.ok_or_else(|| sqlx::Error::RowNotFound.into())
    }

    async fn create_with_price(
        &self,
        url: &str,
        subscriber_id: i64,
        name: Option<&str>,
        price: f64,
    ) -> Result<i64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO products (url, subscriber_id, name, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(url)
        .bind(subscriber_id)
        .bind(name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let (id,): (i64,) =
            sqlx::query_as("SELECT id FROM products WHERE url = ? AND subscriber_id = ?")
                .bind(url)
                .bind(subscriber_id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query("UPDATE products SET current_price = ?, last_checked = ? WHERE id = ?")
            .bind(price)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO price_history (product_id, price, timestamp) VALUES (?, ?, ?)")
            .bind(id)
            .bind(price)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn remove_product(&self, url: &str, subscriber_id: i64) -> Result<u64> {
        let Some(id) = self.product_id(url, subscriber_id).await? else {
            return Ok(0);
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM price_history WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn list_products(&self, subscriber_id: i64) -> Result<Vec<TrackedProduct>> {
        let products = sqlx::query_as::<_, TrackedProduct>(
            "SELECT * FROM products WHERE subscriber_id = ? ORDER BY created_at, id",
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn list_all_products(&self) -> Result<Vec<TrackedProduct>> {
        let products =
            sqlx::query_as::<_, TrackedProduct>("SELECT * FROM products ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    async fn update_price(&self, product_id: i64, price: f64) -> Result<i64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE products SET current_price = ?, last_checked = ? WHERE id = ?")
            .bind(price)
            .bind(now)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let result =
            sqlx::query("INSERT INTO price_history (product_id, price, timestamp) VALUES (?, ?, ?)")
                .bind(product_id)
                .bind(price)
                .bind(now)
                .execute(&mut *tx)
                .await?;

        let history_id = result.last_insert_rowid();
        tx.commit().await?;
        Ok(history_id)
    }

    async fn get_history(&self, product_id: i64, limit: u32) -> Result<Vec<PriceHistoryEntry>> {
        let entries = sqlx::query_as::<_, PriceHistoryEntry>(
            r#"
            SELECT * FROM price_history
            WHERE product_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
