//! Consuming side of the job queue.

use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::AppConfig;
use crate::services::fetcher::{FetchError, HttpImageFetcher};
use crate::services::images::ImageStore;
use crate::services::processor::ImageProcessor;
use crate::services::queue::{JobQueue, QueueError};
use crate::services::webhook::{HttpWebhookNotifier, WebhookError};

const POLL_INTERVAL_MS: u64 = 1000; // 1 second

/// Wire the HTTP-backed collaborators into a processor.
pub fn processor_from_config(
    db: SqlitePool,
    config: &AppConfig,
) -> Result<ImageProcessor, WorkerError> {
    let timeout = config.http_timeout_secs.map(Duration::from_secs);
    let fetcher = HttpImageFetcher::new(timeout)?;
    let notifier = HttpWebhookNotifier::new(timeout)?;

    Ok(ImageProcessor::new(
        db,
        Arc::new(fetcher),
        ImageStore::new(&config.output_dir),
        Arc::new(notifier),
    ))
}

/// Process the next job from the queue.
/// Returns Ok(true) if a job was processed, Ok(false) if no job available.
pub async fn process_next_job(
    processor: &ImageProcessor,
    queue: &dyn JobQueue,
) -> Result<bool, WorkerError> {
    let job = match queue.dequeue().await? {
        Some(j) => j,
        None => return Ok(false),
    };

    tracing::info!(request_id = %job.request_id, "Processing image job");

    let result = processor.process_request(&job.request_id).await;

    // No retries: the job is acknowledged whatever happened.
    queue.complete(&job).await?;

    match result {
        Ok(report) => {
            metrics::counter!("image_jobs_completed_total").increment(1);
            tracing::info!(
                request_id = %job.request_id,
                records = report.records,
                completed = report.completed,
                failed = report.failed,
                "Job finished"
            );
        }
        Err(e) => {
            metrics::counter!("image_jobs_failed_total").increment(1);
            tracing::error!(request_id = %job.request_id, error = %e, "Job failed");
        }
    }

    Ok(true)
}

/// Poll the queue forever, one job at a time.
pub async fn run_worker(processor: ImageProcessor, queue: Arc<dyn JobQueue>, worker_id: usize) {
    tracing::info!(worker_id, "Worker ready, starting job processing loop");

    loop {
        match process_next_job(&processor, queue.as_ref()).await {
            Ok(true) => {
                tracing::debug!(worker_id, "Job processed, checking for next job");
            }
            Ok(false) => {
                if let Ok(depth) = queue.queue_depth().await {
                    metrics::gauge!("image_queue_depth").set(depth as f64);
                }
                tracing::trace!(worker_id, "No jobs available, sleeping");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            Err(e) => {
                tracing::error!(worker_id, error = %e, "Error polling job queue");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        }
    }
}

/// Start `concurrency` worker loops on the current runtime.
pub fn spawn_workers(
    processor: ImageProcessor,
    queue: Arc<dyn JobQueue>,
    concurrency: usize,
) -> Vec<JoinHandle<()>> {
    (0..concurrency.max(1))
        .map(|worker_id| tokio::spawn(run_worker(processor.clone(), queue.clone(), worker_id)))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Failed to build image fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("Failed to build webhook client: {0}")]
    Webhook(#[from] WebhookError),
}
