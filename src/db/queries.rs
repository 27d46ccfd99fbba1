use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use crate::models::product::{NewProduct, ProductRecord, ProductStatus, ProductUpdate};

const PRODUCT_COLUMNS: &str = "id, request_id, product_name, input_image_urls, output_image_urls, \
                               status, webhook_url, created_at, updated_at";

fn product_from_row(row: &SqliteRow) -> Result<ProductRecord, sqlx::Error> {
    let status_str: String = row.try_get("status")?;
    let status = ProductStatus::from_str(&status_str).map_err(|e| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: Box::new(e),
    })?;

    Ok(ProductRecord {
        id: row.try_get("id")?,
        request_id: row.try_get("request_id")?,
        product_name: row.try_get("product_name")?,
        input_image_urls: row.try_get("input_image_urls")?,
        output_image_urls: row.try_get("output_image_urls")?,
        status,
        webhook_url: row.try_get("webhook_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a batch of pending products in one transaction.
///
/// Either every row is committed or none is; a failed insert drops the
/// transaction, which rolls it back.
pub async fn insert_products(
    pool: &SqlitePool,
    products: &[NewProduct],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for product in products {
        sqlx::query(
            r#"
            INSERT INTO products (request_id, product_name, input_image_urls, status, webhook_url)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.request_id)
        .bind(&product.product_name)
        .bind(&product.input_image_urls)
        .bind(ProductStatus::Pending.to_string())
        .bind(&product.webhook_url)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// All products sharing a request ID, oldest first.
pub async fn find_by_request_id(
    pool: &SqlitePool,
    request_id: &str,
) -> Result<Vec<ProductRecord>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE request_id = ? ORDER BY id ASC"
    ))
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(product_from_row).collect()
}

/// First product for a request ID, if any.
pub async fn first_by_request_id(
    pool: &SqlitePool,
    request_id: &str,
) -> Result<Option<ProductRecord>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE request_id = ? ORDER BY id ASC LIMIT 1"
    ))
    .bind(request_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(product_from_row).transpose()
}

/// Apply the job's final states in one transaction.
///
/// Only `Pending` rows are touched, so a record reaches a final status once.
/// Returns the number of rows actually updated.
pub async fn apply_updates(
    pool: &SqlitePool,
    updates: &[ProductUpdate],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut updated = 0;

    for update in updates {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET status = ?,
                output_image_urls = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND status = 'Pending'
            "#,
        )
        .bind(update.status.to_string())
        .bind(&update.output_image_urls)
        .bind(update.id)
        .execute(&mut *tx)
        .await?;

        updated += result.rows_affected();
    }

    tx.commit().await?;
    Ok(updated)
}

/// Number of products in a given status.
pub async fn count_by_status(pool: &SqlitePool, status: ProductStatus) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE status = ?")
        .bind(status.to_string())
        .fetch_one(pool)
        .await
}
