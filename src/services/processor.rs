//! The image-processing job.
//!
//! One job handles every record of a request ID: each input URL is fetched,
//! resized and stored independently, and the per-URL outcomes are reduced to
//! the record's final status. Nothing here is reported back to the uploader
//! except through the stored status and the optional webhook.

use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::db::queries;
use crate::models::api::WebhookPayload;
use crate::models::product::{ProductRecord, ProductStatus, ProductUpdate};
use crate::services::fetcher::ImageFetcher;
use crate::services::images::ImageStore;
use crate::services::webhook::WebhookNotifier;

/// What happened to a single input URL.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    Processed { url: String, output: String },
    Failed { url: String, reason: String },
}

/// Reduce per-URL outcomes to the record's final state.
///
/// Any processed image makes the record `Completed`; otherwise it is
/// `Failed` with no output list.
pub fn summarize(record_id: i64, outcomes: &[ImageOutcome]) -> ProductUpdate {
    let outputs: Vec<&str> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ImageOutcome::Processed { output, .. } => Some(output.as_str()),
            ImageOutcome::Failed { .. } => None,
        })
        .collect();

    if outputs.is_empty() {
        ProductUpdate {
            id: record_id,
            status: ProductStatus::Failed,
            output_image_urls: None,
        }
    } else {
        ProductUpdate {
            id: record_id,
            status: ProductStatus::Completed,
            output_image_urls: Some(outputs.join(",")),
        }
    }
}

/// Per-run summary, used for logging and tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JobReport {
    pub records: usize,
    pub completed: usize,
    pub failed: usize,
    /// Rows whose status actually changed on commit.
    pub committed: u64,
}

/// Runs image-processing jobs against the database and its collaborators.
#[derive(Clone)]
pub struct ImageProcessor {
    db: SqlitePool,
    fetcher: Arc<dyn ImageFetcher>,
    store: Arc<ImageStore>,
    notifier: Arc<dyn WebhookNotifier>,
}

impl ImageProcessor {
    pub fn new(
        db: SqlitePool,
        fetcher: Arc<dyn ImageFetcher>,
        store: ImageStore,
        notifier: Arc<dyn WebhookNotifier>,
    ) -> Self {
        Self {
            db,
            fetcher,
            store: Arc::new(store),
            notifier,
        }
    }

    /// Process every record for `request_id` and commit the results together.
    ///
    /// Per-URL, webhook and commit failures are logged, never returned; only
    /// the initial lookup can fail. Webhooks go out after a successful commit
    /// and only for records that were still `Pending` when loaded.
    pub async fn process_request(&self, request_id: &str) -> Result<JobReport, sqlx::Error> {
        info!(request_id, "Started processing images");
        let start = Instant::now();

        let records = queries::find_by_request_id(&self.db, request_id).await?;
        if records.is_empty() {
            error!(request_id, "No products found for request");
            return Ok(JobReport::default());
        }

        let mut report = JobReport {
            records: records.len(),
            ..JobReport::default()
        };
        let mut updates = Vec::with_capacity(records.len());

        for record in &records {
            let outcomes = self.process_record(record).await;
            let update = summarize(record.id, &outcomes);

            match update.status {
                ProductStatus::Completed => report.completed += 1,
                _ => report.failed += 1,
            }
            info!(
                request_id,
                product_name = %record.product_name,
                status = %update.status,
                "Processed product"
            );

            updates.push(update);
        }

        match queries::apply_updates(&self.db, &updates).await {
            Ok(committed) => {
                report.committed = committed;
                info!(request_id, committed, "Completed processing for request");
                self.notify_transitions(&records, &updates).await;
            }
            Err(e) => {
                metrics::counter!("image_job_commit_failures_total").increment(1);
                error!(request_id, error = %e, "Failed to commit processing results");
            }
        }

        metrics::histogram!("image_job_processing_seconds").record(start.elapsed().as_secs_f64());
        metrics::counter!("image_products_completed_total").increment(report.completed as u64);
        metrics::counter!("image_products_failed_total").increment(report.failed as u64);

        Ok(report)
    }

    async fn notify_transitions(&self, records: &[ProductRecord], updates: &[ProductUpdate]) {
        for (record, update) in records.iter().zip(updates) {
            let Some(webhook_url) = record.webhook_url.as_deref() else {
                continue;
            };
            if record.status != ProductStatus::Pending {
                debug!(
                    request_id = %record.request_id,
                    status = %record.status,
                    "Product already final, skipping webhook"
                );
                continue;
            }
            self.send_webhook(webhook_url, record, update).await;
        }
    }

    async fn process_record(&self, record: &ProductRecord) -> Vec<ImageOutcome> {
        let mut outcomes = Vec::new();

        for url in record.input_urls() {
            info!(request_id = %record.request_id, url, "Processing image");
            let outcome = match self.process_url(url).await {
                Ok(output) => {
                    metrics::counter!("image_urls_processed_total").increment(1);
                    info!(url, output = %output, "Processed image");
                    ImageOutcome::Processed {
                        url: url.to_string(),
                        output,
                    }
                }
                Err(reason) => {
                    metrics::counter!("image_urls_failed_total").increment(1);
                    warn!(url, error = %reason, "Failed to process image");
                    ImageOutcome::Failed {
                        url: url.to_string(),
                        reason,
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn process_url(&self, url: &str) -> Result<String, String> {
        let data = self.fetcher.fetch(url).await.map_err(|e| e.to_string())?;
        self.store.process(url, data).await.map_err(|e| e.to_string())
    }

    async fn send_webhook(
        &self,
        webhook_url: &str,
        record: &ProductRecord,
        update: &ProductUpdate,
    ) {
        let payload = WebhookPayload {
            request_id: record.request_id.clone(),
            product_name: record.product_name.clone(),
            status: update.status,
            output_image_urls: update.output_image_urls.clone(),
        };

        match self.notifier.notify(webhook_url, &payload).await {
            Ok(()) => info!(webhook_url, "Webhook sent"),
            Err(e) => error!(webhook_url, error = %e, "Failed to send webhook"),
        }
    }
}
