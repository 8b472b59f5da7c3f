//! API handlers: `/mapping` and `/api/logs`.

use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::mapping::Document;

/// Body of `GET /api/logs`.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
}

/// `GET /mapping`: the persisted document.
pub async fn get_mapping(State(state): State<AppState>) -> Result<Json<Document>, ApiError> {
    let document = state.mapping.current().await?;
    Ok(Json(document))
}

/// `POST /mapping`: merge a patch, restart the driver, persist.
///
/// A JSON `null` body is an empty patch.
pub async fn post_mapping(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<String, ApiError> {
    let body = body.map_err(|e| ApiError::Unreadable(e.body_text()))?;
    let patch = serde_json::from_slice::<Option<Document>>(&body)
        .map_err(ApiError::Decode)?
        .unwrap_or_default();

    // Run detached so a dropped connection cannot cut the cycle in half.
    let mapping = state.mapping.clone();
    let report = tokio::spawn(async move { mapping.apply_patch(patch).await })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let mut message = String::from("Mapping saved and driver restarted.");
    if !report.skipped.is_empty() {
        message.push_str(&format!(
            " {} patch entries without identity were ignored.",
            report.skipped.len()
        ));
    }
    Ok(message)
}

/// Any other method on `/mapping`.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// `GET /api/logs`: snapshot of the captured output.
pub async fn get_logs(State(state): State<AppState>) -> Json<LogsResponse> {
    Json(LogsResponse {
        logs: state.logs.snapshot(),
    })
}
