//! Site endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{entity_id, not_found, SharedState};
use crate::PAGE_SIZE;

/// Paging window of a site listing request.
///
/// `_limit` is the exclusive end offset, not a count.
#[derive(Debug, Default, Deserialize)]
pub struct SiteWindowQuery {
    #[serde(rename = "_start")]
    pub start: Option<usize>,
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
}

/// GET /site.json
pub async fn list_sites(
    State(state): State<SharedState>,
    Query(query): Query<SiteWindowQuery>,
) -> Response {
    let state = state.read().await;

    let start = query.start.unwrap_or(0);
    let limit = query.limit.unwrap_or(start + PAGE_SIZE as usize);

    Json(json!({
        "entityPrefix": "site",
        "site_collection": state.site_window(start, limit),
    }))
    .into_response()
}

/// GET /site/{id}.json
pub async fn get_site(State(state): State<SharedState>, Path(file): Path<String>) -> Response {
    let Some(id) = entity_id(&file) else {
        return not_found("site", &file);
    };
    let state = state.read().await;

    match state.get_site(&id) {
        Some(site) => Json(site.clone()).into_response(),
        None => not_found("site", &id),
    }
}
