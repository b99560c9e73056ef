//! Axum route handlers for the page lookup API.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::content::models::{NormalizedPage, PageQuery};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub status: &'static str,
    pub data: NormalizedPage,
}

/// GET /get-page?book=&class=&chapter=&page=&type=
/// GET /api/v1/pages (same parameters)
///
/// Degraded (lenient) results are still `"status": "success"`.
pub async fn handle_get_page(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PageResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let outcome = state.engine.resolve_page(&query).await?;
    if outcome.is_degraded() {
        debug!("Degraded page for {:?}", query);
    }
    Ok(Json(PageResponse {
        status: "success",
        data: outcome.into_page(),
    }))
}
