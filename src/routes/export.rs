use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::app_state::AppState;
use crate::db::queries;
use crate::error::{ApiError, ApiResult};
use crate::services::spreadsheet;

/// GET /export/{request_id} — download the first matching record as CSV.
pub async fn export_csv(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let record = queries::first_by_request_id(&state.db, &request_id)
        .await?
        .ok_or_else(ApiError::request_not_found)?;

    let body = spreadsheet::render_export(&record)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment;filename=output_{request_id}.csv"),
            ),
        ],
        body,
    ))
}
