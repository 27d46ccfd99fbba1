use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::api::UploadResponse;
use crate::services::{ingest, spreadsheet};

/// POST /upload — accept a product spreadsheet and schedule image processing.
///
/// Expects a multipart `file` field and an optional `webhook_url` text field
/// applied to rows without their own webhook.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    tracing::info!("Received upload request");

    let mut file = None;
    let mut webhook_url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error("Invalid multipart body"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(multipart_error("Failed to read upload"))?;
                file = Some(data);
            }
            Some("webhook_url") => {
                let text = field
                    .text()
                    .await
                    .map_err(multipart_error("Invalid webhook_url field"))?;
                let text = text.trim();
                if !text.is_empty() {
                    webhook_url = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| {
        tracing::error!("No file uploaded");
        ApiError::BadRequest("No file uploaded".to_string())
    })?;

    let rows = spreadsheet::parse_products(&file, webhook_url.as_deref())?;
    tracing::info!(rows = rows.len(), "CSV parsed successfully");

    let request_ids = ingest::ingest_rows(&state.db, state.queue.as_ref(), rows, || {
        Uuid::new_v4().to_string()
    })
    .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadResponse {
            message: "Upload successful".to_string(),
            request_ids,
        }),
    ))
}

/// Bodies cut off by the upload limit are 413; anything else is malformed input.
fn multipart_error(context: &'static str) -> impl Fn(MultipartError) -> ApiError {
    move |err| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::error!(error = %err, "Upload exceeds size limit");
            ApiError::PayloadTooLarge("Upload exceeds size limit".to_string())
        } else {
            ApiError::BadRequest(format!("{context}: {err}"))
        }
    }
}
