//! Drops and recreates the products table. Every record is lost.

use product_image_processor::{config::AppConfig, db};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    db::recreate_tables(&db_pool)
        .await
        .expect("Failed to recreate tables");

    db_pool.close().await;
}
