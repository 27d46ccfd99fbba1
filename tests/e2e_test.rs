//! End-to-end tests: upload through the router, process the queued jobs with
//! the real HTTP fetcher against a local image host, then poll status.

mod fixtures;
mod helpers;

use axum::http::StatusCode;
use fixtures::*;
use helpers::*;

async fn request_ids(response: axum::response::Response) -> Vec<String> {
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    serde_json::from_value(body_json(response).await["request_ids"].clone()).unwrap()
}

#[tokio::test]
async fn test_e2e_shoe_completes_and_bag_fails() {
    let host = spawn_image_host().await;
    let app = TestApp::new().await;
    let output_dir = tempfile::tempdir().unwrap();

    let upload = shoe_and_bag_csv(&host.base_url);
    let ids = request_ids(app.upload(Some(upload.as_str()), None).await).await;
    assert_eq!(ids.len(), 2);

    let processor = app.processor(output_dir.path());
    assert_eq!(app.drain_queue(&processor).await, 2);

    let shoe = body_json(app.get(&format!("/status/{}", ids[0])).await).await;
    assert_eq!(shoe["products"][0]["product_name"], "Shoe");
    assert_eq!(shoe["products"][0]["status"], "Completed");
    assert_eq!(shoe["products"][0]["output_image_urls"], "processed_shoe.png");

    let written = std::fs::read(output_dir.path().join("processed_shoe.png")).unwrap();
    let resized = image::load_from_memory(&written).unwrap();
    assert_eq!((resized.width(), resized.height()), (20, 15));

    let bag = body_json(app.get(&format!("/status/{}", ids[1])).await).await;
    assert_eq!(bag["products"][0]["product_name"], "Bag");
    assert_eq!(bag["products"][0]["status"], "Failed");
    assert!(bag["products"][0]["output_image_urls"].is_null());
}

#[tokio::test]
async fn test_e2e_partial_success_exports_processed_subset() {
    let host = spawn_image_host().await;
    let app = TestApp::new().await;
    let output_dir = tempfile::tempdir().unwrap();

    let base = &host.base_url;
    let upload = format!(
        "Product Name,Input Image Urls\n\
         Jacket,\"{base}/images/front.png,{base}/images/missing-side.png,{base}/images/back.png\"\n"
    );
    let ids = request_ids(app.upload(Some(upload.as_str()), None).await).await;

    app.drain_queue(&app.processor(output_dir.path())).await;

    let response = app.get(&format!("/export/{}", ids[0])).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).unwrap();

    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(&row[1], "Jacket");
    assert_eq!(&row[3], "processed_front.png,processed_back.png");
}

#[tokio::test]
async fn test_e2e_webhook_is_notified() {
    let host = spawn_image_host().await;
    let app = TestApp::new().await;
    let output_dir = tempfile::tempdir().unwrap();

    let upload = shoe_and_bag_csv(&host.base_url);
    let hook = format!("{}/hook", host.base_url);
    let ids = request_ids(app.upload(Some(upload.as_str()), Some(hook.as_str())).await).await;

    app.drain_queue(&app.processor(output_dir.path())).await;

    let webhooks = host.webhooks.lock().await;
    assert_eq!(webhooks.len(), 2);

    let shoe = webhooks
        .iter()
        .find(|payload| payload["request_id"] == ids[0].as_str())
        .expect("No webhook for Shoe");
    assert_eq!(shoe["product_name"], "Shoe");
    assert_eq!(shoe["status"], "Completed");
    assert_eq!(shoe["output_image_urls"], "processed_shoe.png");

    let bag = webhooks
        .iter()
        .find(|payload| payload["request_id"] == ids[1].as_str())
        .expect("No webhook for Bag");
    assert_eq!(bag["status"], "Failed");
    assert!(bag["output_image_urls"].is_null());
}

#[tokio::test]
async fn test_e2e_unreachable_webhook_keeps_status() {
    let host = spawn_image_host().await;
    let app = TestApp::new().await;
    let output_dir = tempfile::tempdir().unwrap();

    let upload = shoe_and_bag_csv(&host.base_url);
    // The image host has no route here, so delivery gets a 404.
    let hook = format!("{}/no-such-hook", host.base_url);
    let ids = request_ids(app.upload(Some(upload.as_str()), Some(hook.as_str())).await).await;

    app.drain_queue(&app.processor(output_dir.path())).await;

    let shoe = body_json(app.get(&format!("/status/{}", ids[0])).await).await;
    assert_eq!(shoe["products"][0]["status"], "Completed");
    assert!(host.webhooks.lock().await.is_empty());
}
