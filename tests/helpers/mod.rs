//! Test helpers: in-process app, multipart requests, a local image host.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use metrics_exporter_prometheus::PrometheusBuilder;
use product_image_processor::{
    app_state::AppState,
    db,
    routes,
    services::{
        fetcher::HttpImageFetcher, images::ImageStore, processor::ImageProcessor,
        queue::{InMemoryJobQueue, JobQueue, QueueError, QueuedJob},
        webhook::HttpWebhookNotifier,
    },
    worker,
};
use sqlx::SqlitePool;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

const BOUNDARY: &str = "product-images-test-boundary";
const UPLOAD_LIMIT: usize = 1024 * 1024;

/// Router wired to an in-memory database and queue.
pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub queue: Arc<InMemoryJobQueue>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = db::in_memory_pool().await.expect("Failed to create database");
        let queue = Arc::new(InMemoryJobQueue::new());

        Self {
            router: test_router(db.clone(), queue.clone()),
            db,
            queue,
        }
    }

    /// Size limit applied to request bodies.
    pub fn upload_limit() -> usize {
        UPLOAD_LIMIT
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed")
    }

    pub async fn upload(&self, csv: Option<&str>, webhook_url: Option<&str>) -> Response {
        self.send(multipart_upload(csv.map(str::as_bytes), webhook_url))
            .await
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Processor that really downloads over HTTP, writing into `output_dir`.
    pub fn processor(&self, output_dir: &std::path::Path) -> ImageProcessor {
        ImageProcessor::new(
            self.db.clone(),
            Arc::new(HttpImageFetcher::new(None).unwrap()),
            ImageStore::new(output_dir),
            Arc::new(HttpWebhookNotifier::new(None).unwrap()),
        )
    }

    /// Run queued jobs until the queue is empty; returns how many ran.
    pub async fn drain_queue(&self, processor: &ImageProcessor) -> usize {
        let mut processed = 0;
        while worker::process_next_job(processor, self.queue.as_ref())
            .await
            .expect("Queue failure")
        {
            processed += 1;
        }
        processed
    }
}

/// Router over `db` dispatching jobs to `queue`.
pub fn test_router(db: SqlitePool, queue: Arc<dyn JobQueue>) -> Router {
    let state = AppState::new(db, queue, UPLOAD_LIMIT);
    let prometheus = PrometheusBuilder::new().build_recorder().handle();
    routes::router(state, prometheus)
}

/// Queue whose `enqueue` always fails, as when the broker rejects a job.
pub struct RejectingQueue;

#[async_trait]
impl JobQueue for RejectingQueue {
    async fn enqueue(&self, _job: &QueuedJob) -> Result<(), QueueError> {
        let err = serde_json::from_str::<QueuedJob>("{").unwrap_err();
        Err(QueueError::Serialize(err))
    }

    async fn dequeue(&self) -> Result<Option<QueuedJob>, QueueError> {
        Ok(None)
    }

    async fn complete(&self, _job: &QueuedJob) -> Result<(), QueueError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), QueueError> {
        Ok(())
    }

    async fn queue_depth(&self) -> Result<u64, QueueError> {
        Ok(0)
    }
}

/// Build a multipart `/upload` request with optional `file` and `webhook_url` parts.
pub fn multipart_upload(file: Option<&[u8]>, webhook_url: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();

    if let Some(data) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"products.csv\"\r\nContent-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(url) = webhook_url {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"webhook_url\"\r\n\r\n{url}\r\n")
                .as_bytes(),
        );
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 120, 200]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Local HTTP host serving images and collecting webhook calls.
///
/// `/images/{name}` returns a 40x30 PNG unless the name starts with
/// `missing`; `/hook` records every JSON body it receives.
pub struct ImageHost {
    pub base_url: String,
    pub webhooks: Arc<Mutex<Vec<serde_json::Value>>>,
}

pub async fn spawn_image_host() -> ImageHost {
    let webhooks = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/images/{name}", get(serve_image))
        .route("/hook", post(record_webhook))
        .with_state(webhooks.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ImageHost {
        base_url: format!("http://{addr}"),
        webhooks,
    }
}

async fn serve_image(Path(name): Path<String>) -> Response {
    if name.starts_with("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], png_bytes(40, 30)).into_response()
}

async fn record_webhook(
    State(webhooks): State<Arc<Mutex<Vec<serde_json::Value>>>>,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    webhooks.lock().await.push(payload);
    StatusCode::OK
}
