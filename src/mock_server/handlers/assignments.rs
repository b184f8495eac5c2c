//! Assignment endpoint handlers.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::{entity_id, not_found, SharedState};

/// GET /assignment/site/{site_id}.json
///
/// Unknown sites answer with an empty listing, as the server does.
pub async fn list_site_assignments(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Response {
    let Some(site_id) = entity_id(&file) else {
        return not_found("site", &file);
    };
    let state = state.read().await;

    let assignments = state.assignments.get(&site_id).cloned().unwrap_or_default();

    Json(json!({
        "entityPrefix": "assignment",
        "assignment_collection": assignments,
    }))
    .into_response()
}

/// GET /assignment/item/{id}.json
pub async fn get_assignment(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Response {
    let Some(id) = entity_id(&file) else {
        return not_found("assignment", &file);
    };
    let state = state.read().await;

    match state.get_assignment(&id) {
        Some(assignment) => Json(assignment.clone()).into_response(),
        None => not_found("assignment", &id),
    }
}
