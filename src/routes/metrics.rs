use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Register descriptions for the metrics emitted by uploads and workers.
pub fn describe_metrics() {
    metrics::describe_counter!("image_jobs_enqueued_total", "Image jobs submitted by uploads");
    metrics::describe_counter!("image_jobs_completed_total", "Image jobs run to completion");
    metrics::describe_counter!(
        "image_jobs_failed_total",
        "Image jobs that could not load their records"
    );
    metrics::describe_counter!("image_urls_processed_total", "Input image URLs resized and stored");
    metrics::describe_counter!(
        "image_urls_failed_total",
        "Input image URLs that could not be processed"
    );
    metrics::describe_counter!("image_products_completed_total", "Products marked Completed");
    metrics::describe_counter!("image_products_failed_total", "Products marked Failed");
    metrics::describe_counter!(
        "image_job_commit_failures_total",
        "Job result commits rejected by the database"
    );
    metrics::describe_histogram!(
        "image_job_processing_seconds",
        "Time to process all images of one request"
    );
    metrics::describe_gauge!("image_queue_depth", "Jobs waiting in the queue");
}

/// GET /metrics — Prometheus text exposition.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}
