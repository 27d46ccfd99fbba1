use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Schema applied by the migrator and by [`recreate_tables`].
const PRODUCTS_SCHEMA: &str = include_str!("../../migrations/0001_create_products.sql");

/// Initialize SQLite connection pool
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(options)
        .await
}

/// In-memory database with the schema applied, for tests.
///
/// Every SQLite in-memory connection is its own database, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn in_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Drop the products table and create it again, wiping every record.
pub async fn recreate_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DROP TABLE IF EXISTS products")
        .execute(&mut *tx)
        .await?;
    tracing::info!("Dropped products table");

    sqlx::raw_sql(PRODUCTS_SCHEMA).execute(&mut *tx).await?;
    tracing::info!("Created products table");

    tx.commit().await
}

pub mod queries;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recreate_tables_wipes_records() {
        let pool = in_memory_pool().await.unwrap();
        sqlx::query(
            "INSERT INTO products (request_id, product_name, input_image_urls) VALUES ('r1', 'Shoe', 'https://a.test/1.png')",
        )
        .execute(&pool)
        .await
        .unwrap();

        recreate_tables(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
