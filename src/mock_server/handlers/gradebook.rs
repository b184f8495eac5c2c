//! Gradebook endpoint handlers.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use super::{entity_id, not_found, SharedState};

/// GET /gradebook/site/{site_id}.json
///
/// Sites without a gradebook answer 404.
pub async fn get_site_gradebook(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Response {
    let Some(site_id) = entity_id(&file) else {
        return not_found("gradebook", &file);
    };
    let state = state.read().await;

    match state.gradebooks.get(&site_id) {
        Some(gradebook) => Json(gradebook.clone()).into_response(),
        None => not_found("gradebook", &site_id),
    }
}
