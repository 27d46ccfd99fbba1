use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Optional for worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// SQLite connection string
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Redis connection string for the job queue. When unset the server
    /// runs its workers in-process on an in-memory queue.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Directory receiving resized images
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of concurrent worker loops
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,

    /// Timeout for image downloads and webhook calls; client default when unset
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    /// Prometheus scrape address of the standalone worker
    #[serde(default = "default_worker_metrics_addr")]
    pub worker_metrics_addr: String,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_database_url() -> String {
    "sqlite://images.db?mode=rwc".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("processed")
}

fn default_worker_concurrency() -> usize {
    4
}

fn default_worker_metrics_addr() -> String {
    "0.0.0.0:9100".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
