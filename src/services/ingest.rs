use garde::Validate;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db::queries;
use crate::models::product::NewProduct;
use crate::services::queue::{JobQueue, QueueError, QueuedJob};
use crate::services::spreadsheet::SpreadsheetRow;

/// Store one pending record per row, then enqueue one job per request ID.
///
/// Rows are committed as a single batch; jobs are only dispatched after the
/// commit succeeds. `next_id` supplies a fresh request ID per row.
pub async fn ingest_rows<F>(
    db: &SqlitePool,
    queue: &dyn JobQueue,
    rows: Vec<SpreadsheetRow>,
    mut next_id: F,
) -> Result<Vec<String>, IngestError>
where
    F: FnMut() -> String,
{
    let mut products = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let product = NewProduct {
            request_id: next_id(),
            product_name: row.product_name,
            input_image_urls: row.input_image_urls,
            webhook_url: row.webhook_url,
        };
        product.validate().map_err(|report| IngestError::InvalidRow {
            row: index + 1,
            reason: report.to_string(),
        })?;
        info!(
            product_name = %product.product_name,
            request_id = %product.request_id,
            "Staged product"
        );
        products.push(product);
    }

    queries::insert_products(db, &products).await.map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            error!(error = %e, "Duplicate request ID in batch");
            IngestError::DuplicateRequestId
        }
        other => IngestError::Database(other),
    })?;
    info!(rows = products.len(), "Database commit successful");

    let request_ids: Vec<String> = products.into_iter().map(|p| p.request_id).collect();
    for request_id in &request_ids {
        queue.enqueue(&QueuedJob::new(request_id.as_str())).await?;
        metrics::counter!("image_jobs_enqueued_total").increment(1);
        info!(request_id = %request_id, "Enqueued image processing job");
    }

    Ok(request_ids)
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Duplicate request ID encountered")]
    DuplicateRequestId,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to enqueue job: {0}")]
    Queue(#[from] QueueError),
}
