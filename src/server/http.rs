//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::errors::SfError;
use crate::storage::models::{CatalogStats, Clip, ClipQuery, NewClip};

use super::AppState;

/// Error surfaced to API callers as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<SfError> for ApiError {
    fn from(err: SfError) -> Self {
        match err {
            SfError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("API error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// List clips matching `q`, `tag`, `page` and `limit`
pub async fn list_shorts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Clip>>, ApiError> {
    let query = ClipQuery::from_pairs(&params);
    let clips = state.storage.query(&query)?;
    tracing::debug!(
        q = ?query.q,
        tag = ?query.tag,
        page = query.effective_page(),
        limit = query.effective_limit(),
        returned = clips.len(),
        "listed shorts"
    );
    Ok(Json(clips))
}

/// Add a clip from a `{videoUrl, title, tags}` body
pub async fn add_short(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Clip>), ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid body".to_string()))?;
    let new_clip = NewClip::from_value(&value)?;
    let clip = state.storage.insert(new_clip)?;
    tracing::info!(id = clip.id, title = %clip.title, "added short");
    Ok((StatusCode::CREATED, Json(clip)))
}

/// Catalog statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<CatalogStats>, ApiError> {
    Ok(Json(state.storage.stats()?))
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET, POST")],
        "Method Not Allowed",
    )
}
