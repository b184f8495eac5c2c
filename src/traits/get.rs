//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::error::{Result, SakaiError};
use crate::fields::Fields;
use crate::session::Session;
use crate::traits::Entity;

/// Fetch a single entity from its detail endpoint, or adopt fields that a
/// listing already returned.
///
/// # Example
///
/// ```ignore
/// use sakai_direct::{Assignment, Get, Session};
///
/// let session = Session::from_env()?;
/// let assignment = Assignment::get(&session, "a-123").await?;
/// ```
#[async_trait]
pub trait Get: Entity + Send {
    /// Detail endpoint path for `id`, relative to the base URL.
    fn detail_path(id: &str) -> String;

    /// Error reported when the detail endpoint answers with a failure status.
    fn not_found(id: &str) -> SakaiError;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error if the detail request fails with a
    /// non-success status, or a protocol error if the body is not a JSON
    /// object.
    async fn get(session: &Session, id: &str) -> Result<Self> {
        Self::fetch_or_adopt(session, id, None).await
    }

    /// Use `prefetched` when given, otherwise fetch the detail endpoint.
    async fn fetch_or_adopt(
        session: &Session,
        id: &str,
        prefetched: Option<Fields>,
    ) -> Result<Self> {
        let fields = match prefetched {
            Some(fields) => {
                tracing::debug!(entity = Self::ENTITY_TYPE, id, "adopting prefetched fields");
                fields
            }
            None => {
                let path = Self::detail_path(id);
                tracing::debug!(entity = Self::ENTITY_TYPE, id, %path, "fetching detail");
                let body = match session.get_json(&path).await {
                    Ok(body) => body,
                    Err(SakaiError::ApiError { .. }) => return Err(Self::not_found(id)),
                    Err(e) => return Err(e),
                };
                Fields::try_from(body)?
            }
        };

        Self::from_fields(fields)
    }
}
