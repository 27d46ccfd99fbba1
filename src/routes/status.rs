use axum::extract::{Path, State};
use axum::Json;

use crate::app_state::AppState;
use crate::db::queries;
use crate::error::{ApiError, ApiResult};
use crate::models::api::StatusResponse;

/// GET /status/{request_id} — current state of every product for a request.
pub async fn check_status(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    tracing::info!(request_id = %request_id, "Checking status");

    let products = queries::find_by_request_id(&state.db, &request_id).await?;
    if products.is_empty() {
        tracing::error!(request_id = %request_id, "Request ID not found");
        return Err(ApiError::request_not_found());
    }

    Ok(Json(StatusResponse {
        products: products.into_iter().map(Into::into).collect(),
    }))
}
