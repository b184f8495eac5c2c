//! Pagination and identity deduplication for listing endpoints.
//!
//! Listing endpoints return an object holding a named array of items
//! (`site_collection`, `assignment_collection`, ...). Paginated endpoints
//! take `_start`/`_limit` offsets; an empty array means there is no more
//! data. Every build funnels through [`Collection::absorb`], which keeps the
//! first occurrence of each entity and silently drops later duplicates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, SakaiError};
use crate::fields::{json_kind, Fields};
use crate::session::Session;
use crate::traits::List;

/// Items requested per page.
pub const PAGE_SIZE: u32 = 50;

/// Maximum offset scanned before giving up on an endpoint that never
/// returns an empty page.
pub const SCAN_BOUND: u32 = 1000;

/// Offset window sent as query parameters.
///
/// `_limit` is the exclusive end offset of the window, not its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    #[serde(rename = "_start")]
    pub start: u32,
    #[serde(rename = "_limit")]
    pub limit: u32,
}

impl PageWindow {
    /// Window of `page_size` items beginning at `start`.
    #[must_use]
    pub fn at(start: u32, page_size: u32) -> Self {
        Self {
            start,
            limit: start + page_size,
        }
    }
}

/// Page size and scan bound for a paged build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    pub page_size: u32,
    pub scan_bound: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            scan_bound: SCAN_BOUND,
        }
    }
}

impl PageConfig {
    /// Every window the build may request, in order.
    pub fn windows(&self) -> impl Iterator<Item = PageWindow> {
        let page_size = self.page_size.max(1);
        (0..self.scan_bound)
            .step_by(page_size as usize)
            .map(move |start| PageWindow::at(start, page_size))
    }

    /// Upper bound on the number of requests a build issues.
    #[must_use]
    pub fn max_requests(&self) -> usize {
        self.windows().count()
    }
}

/// An ordered collection of entities with no two equal members.
///
/// Iteration order is the order items were first observed from the API.
/// Collections are built once and are read-only afterwards.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    seen: HashSet<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T> Collection<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: List> Collection<T> {
    /// Build a collection from already-constructed entities, applying the
    /// same first-seen deduplication as a fetch.
    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut collection = Self::default();
        for entity in entities {
            let key = T::identity_key(entity.fields())?;
            collection.insert_first_seen(key, entity);
        }
        Ok(collection)
    }

    /// Keep `item` unless its identity key was already seen or it equals an
    /// item already kept. Returns whether the item was kept.
    fn insert_first_seen(&mut self, key: String, item: T) -> bool {
        if self.seen.contains(&key) || self.items.contains(&item) {
            self.seen.insert(key);
            return false;
        }
        self.seen.insert(key);
        self.items.push(item);
        true
    }

    /// Project a page of raw items into entities, skipping duplicates and
    /// items the query filters out. Returns the number of items kept.
    pub(crate) fn absorb(&mut self, query: &T::Query, page: Vec<Fields>) -> Result<usize> {
        let mut kept = 0;
        for fields in page {
            let key = T::identity_key(&fields)?;
            if self.seen.contains(&key) {
                tracing::debug!(entity = T::ENTITY_TYPE, %key, "dropping duplicate");
                continue;
            }

            let item = T::from_fields(fields)?;
            if !T::accepts(query, &item) {
                continue;
            }

            if self.insert_first_seen(key, item) {
                kept += 1;
            } else {
                tracing::debug!(entity = T::ENTITY_TYPE, "dropping item equal to an earlier one");
            }
        }
        Ok(kept)
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

/// Extract the listing array named `key` from a response body.
pub(crate) fn parse_listing(body: Value, key: &str) -> Result<Vec<Fields>> {
    let Value::Object(mut object) = body else {
        return Err(SakaiError::unexpected_shape(format!(
            "listing response is {}, expected an object",
            json_kind(&body)
        )));
    };

    match object.remove(key) {
        Some(Value::Array(items)) => items.into_iter().map(Fields::try_from).collect(),
        Some(other) => Err(SakaiError::unexpected_shape(format!(
            "'{key}' is {}, expected an array",
            json_kind(&other)
        ))),
        None => Err(SakaiError::unexpected_shape(format!(
            "listing response has no '{key}' array"
        ))),
    }
}

/// Fetch one page (or the whole listing, for unpaginated endpoints).
pub async fn fetch_page<T: List>(
    session: &Session,
    query: &T::Query,
    window: Option<PageWindow>,
) -> Result<Vec<Fields>> {
    let path = T::listing_path(query);
    let body = match window {
        Some(window) => session.get_json_with_query(&path, &window).await?,
        None => session.get_json(&path).await?,
    };
    parse_listing(body, T::COLLECTION_KEY)
}

/// Build a collection by walking every page window until an empty page.
///
/// Issues at most [`PageConfig::max_requests`] requests. Any failing page
/// aborts the whole build.
pub async fn collect_paged<T: List>(
    session: &Session,
    query: &T::Query,
    config: &PageConfig,
) -> Result<Collection<T>> {
    let mut collection = Collection::default();
    let mut exhausted = false;

    for window in config.windows() {
        let page = fetch_page::<T>(session, query, Some(window)).await?;
        if page.is_empty() {
            tracing::debug!(entity = T::ENTITY_TYPE, start = window.start, "empty page, listing complete");
            exhausted = true;
            break;
        }

        let received = page.len();
        let kept = collection.absorb(query, page)?;
        tracing::debug!(
            entity = T::ENTITY_TYPE,
            start = window.start,
            received,
            kept,
            "absorbed page"
        );
    }

    if !exhausted {
        tracing::warn!(
            entity = T::ENTITY_TYPE,
            scan_bound = config.scan_bound,
            "reached scan bound without an empty page, stopping"
        );
    }

    Ok(collection)
}

/// Build a collection from a single, unpaginated listing request.
pub async fn collect_single<T: List>(session: &Session, query: &T::Query) -> Result<Collection<T>> {
    let page = fetch_page::<T>(session, query, None).await?;
    collect_from_items(query, page)
}

/// Build a collection from a listing document obtained without a request
/// (e.g. a local cache file).
pub(crate) fn collect_from_body<T: List>(query: &T::Query, body: Value) -> Result<Collection<T>> {
    collect_from_items(query, parse_listing(body, T::COLLECTION_KEY)?)
}

fn collect_from_items<T: List>(query: &T::Query, items: Vec<Fields>) -> Result<Collection<T>> {
    let mut collection = Collection::default();
    collection.absorb(query, items)?;
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;
    use crate::SiteListQuery;
    use serde_json::json;

    fn page(items: Value) -> Vec<Fields> {
        parse_listing(json!({ "site_collection": items }), "site_collection").unwrap()
    }

    #[test]
    fn test_windows_cover_scan_bound() {
        let windows: Vec<_> = PageConfig::default().windows().collect();
        assert_eq!(windows.len(), 20);
        assert_eq!(windows[0], PageWindow { start: 0, limit: 50 });
        assert_eq!(windows[19], PageWindow { start: 950, limit: 1000 });
        assert_eq!(PageConfig::default().max_requests(), 20);
    }

    #[test]
    fn test_window_query_serialization() {
        let query = serde_qs::to_string(&PageWindow::at(100, 50)).unwrap();
        assert_eq!(query, "_start=100&_limit=150");
    }

    #[test]
    fn test_absorb_keeps_first_occurrence() {
        let query = SiteListQuery::default();
        let mut sites: Collection<Site> = Collection::default();

        let kept = sites
            .absorb(
                &query,
                page(json!([
                    {"id": "s1", "title": "First"},
                    {"id": "s2", "title": "Second"},
                ])),
            )
            .unwrap();
        assert_eq!(kept, 2);

        let kept = sites
            .absorb(
                &query,
                page(json!([
                    {"id": "s1", "title": "First (changed)"},
                    {"id": "s3", "title": "Third"},
                ])),
            )
            .unwrap();
        assert_eq!(kept, 1);

        let ids: Vec<_> = sites.iter().map(Site::id).collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
        assert_eq!(sites.first().unwrap().title(), Some("First"));
    }

    #[test]
    fn test_absorb_rejects_item_without_identity() {
        let mut sites: Collection<Site> = Collection::default();
        let err = sites
            .absorb(&SiteListQuery::default(), page(json!([{"title": "anonymous"}])))
            .unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn test_parse_listing_shapes() {
        assert!(parse_listing(json!([]), "site_collection").unwrap_err().is_protocol());
        assert!(parse_listing(json!({}), "site_collection").unwrap_err().is_protocol());
        assert!(parse_listing(json!({"site_collection": {}}), "site_collection")
            .unwrap_err()
            .is_protocol());
        assert!(parse_listing(json!({"site_collection": [1]}), "site_collection")
            .unwrap_err()
            .is_protocol());
        assert!(parse_listing(json!({"site_collection": []}), "site_collection")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_collection_serializes_as_array() {
        let sites: Collection<Site> =
            collect_from_body(&SiteListQuery::default(), json!({"site_collection": [{"id": "s1"}]}))
                .unwrap();
        assert_eq!(serde_json::to_value(&sites).unwrap(), json!([{"id": "s1"}]));
    }
}
