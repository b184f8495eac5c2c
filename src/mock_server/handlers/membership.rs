//! Membership endpoint handlers.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::{entity_id, not_found, SharedState};

/// GET /membership/site/{site_id}.json
pub async fn list_site_members(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Response {
    let Some(site_id) = entity_id(&file) else {
        return not_found("site", &file);
    };
    let state = state.read().await;

    if state.get_site(&site_id).is_none() && !state.members.contains_key(&site_id) {
        return not_found("site", &site_id);
    }

    let members = state.members.get(&site_id).cloned().unwrap_or_default();

    Json(json!({
        "entityPrefix": "membership",
        "membership_collection": members,
    }))
    .into_response()
}
