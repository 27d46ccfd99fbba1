use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use product_image_processor::{
    app_state::AppState,
    config::AppConfig,
    db, routes,
    services::queue::{InMemoryJobQueue, JobQueue, RedisJobQueue},
    worker,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing product-image-processor server");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    routes::metrics::describe_metrics();

    tracing::info!(database_url = %config.database_url, "Connecting to SQLite database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let queue: Arc<dyn JobQueue> = match &config.redis_url {
        Some(redis_url) => {
            tracing::info!("Connecting to Redis job queue; run the worker binary to process jobs");
            Arc::new(RedisJobQueue::new(redis_url).expect("Failed to initialize job queue"))
        }
        None => {
            tracing::info!(
                workers = config.worker_concurrency,
                "No REDIS_URL set, processing jobs in-process"
            );
            let queue: Arc<dyn JobQueue> = Arc::new(InMemoryJobQueue::new());
            let processor = worker::processor_from_config(db_pool.clone(), &config)
                .expect("Failed to initialize image processor");
            worker::spawn_workers(processor, queue.clone(), config.worker_concurrency);
            queue
        }
    };

    let state = AppState::new(db_pool, queue, config.max_upload_bytes);
    let app = routes::router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
