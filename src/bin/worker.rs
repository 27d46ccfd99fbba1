use metrics_exporter_prometheus::PrometheusBuilder;
use product_image_processor::{
    config::AppConfig,
    db,
    routes::metrics::describe_metrics,
    services::queue::{JobQueue, RedisJobQueue},
    worker,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting image processing worker");

    let config = AppConfig::from_env().expect("Failed to load configuration");
    let redis_url = config
        .redis_url
        .as_deref()
        .expect("REDIS_URL must be set for the standalone worker");

    let metrics_addr: SocketAddr = config
        .worker_metrics_addr
        .parse()
        .expect("WORKER_METRICS_ADDR must be a socket address");
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .expect("Failed to install Prometheus exporter");
    tracing::info!(%metrics_addr, "Serving worker metrics");
    describe_metrics();

    tracing::info!("Connecting to SQLite");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let queue: Arc<dyn JobQueue> =
        Arc::new(RedisJobQueue::new(redis_url).expect("Failed to initialize job queue"));

    let processor = worker::processor_from_config(db_pool, &config)
        .expect("Failed to initialize image processor");

    let handles = worker::spawn_workers(processor, queue, config.worker_concurrency);
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Worker task exited");
        }
    }
}
