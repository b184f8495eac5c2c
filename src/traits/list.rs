//! List trait for building collections from listing endpoints.

use async_trait::async_trait;

use crate::error::Result;
use crate::fields::Fields;
use crate::pagination::{self, Collection, PageConfig};
use crate::session::Session;
use crate::traits::Entity;

/// Build deduplicated collections from a listing endpoint.
///
/// Each implementor describes its endpoint: the path, the name of the
/// array holding the items, whether the endpoint is paginated, and how to
/// derive the identity key from a raw item. Equality (`PartialEq`) is the
/// entity's own notion of "same record" and is consulted in addition to the
/// identity key when deduplicating.
///
/// # Example
///
/// ```ignore
/// use sakai_direct::{List, Session, Site, SiteListQuery};
///
/// let session = Session::from_env()?;
/// let sites = Site::list_all(&session, &SiteListQuery::default()).await?;
/// ```
#[async_trait]
pub trait List: Entity + PartialEq + Send + Sync {
    /// Parameters selecting the listing (e.g. a site id).
    type Query: Send + Sync;

    /// Name of the array field holding the items.
    const COLLECTION_KEY: &'static str;

    /// Whether the endpoint honours `_start`/`_limit` windows.
    const PAGINATED: bool;

    /// Listing endpoint path, relative to the base URL.
    fn listing_path(query: &Self::Query) -> String;

    /// Dedup key for a raw listing item.
    fn identity_key(item: &Fields) -> Result<String>;

    /// Client-side filter applied before deduplication.
    fn accepts(_query: &Self::Query, _item: &Self) -> bool {
        true
    }

    /// Fetch the complete listing.
    ///
    /// # Errors
    ///
    /// Returns an error if any request fails or any page is malformed; no
    /// partial collection is returned.
    async fn list_all(session: &Session, query: &Self::Query) -> Result<Collection<Self>> {
        if Self::PAGINATED {
            pagination::collect_paged(session, query, &PageConfig::default()).await
        } else {
            pagination::collect_single(session, query).await
        }
    }
}
