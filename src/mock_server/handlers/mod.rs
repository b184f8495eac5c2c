//! HTTP request handlers for the mock server.

use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use tokio::sync::RwLock;

use super::state::MockState;

pub mod assignments;
pub mod gradebook;
pub mod membership;
pub mod session;
pub mod sites;

pub use assignments::*;
pub use gradebook::*;
pub use membership::*;
pub use session::*;
pub use sites::*;

pub(crate) type SharedState = Arc<RwLock<MockState>>;

/// Strip the `.json` format suffix from a path segment.
///
/// Segments without the suffix are not JSON requests and yield `None`.
pub(crate) fn entity_id(segment: &str) -> Option<String> {
    let id = segment.strip_suffix(".json")?;
    Some(
        urlencoding::decode(id)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| id.to_string()),
    )
}

pub(crate) fn not_found(entity: &str, id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": format!("{entity} not found"),
            "message": format!("No {entity} found with id: {id}")
        })),
    )
        .into_response()
}
