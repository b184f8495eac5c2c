//! Site model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::LocalCache;
use crate::error::{Result, SakaiError};
use crate::fields::Fields;
use crate::models::{AssignmentCollection, Gradebook, MembershipCollection};
use crate::pagination::Collection;
use crate::session::Session;
use crate::traits::{Entity, Get, List};

/// A Sakai site: a course or project workspace.
///
/// Equality is plain value equality over the whole field mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    fields: Fields,
}

impl Site {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.str("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.str("description")
    }

    pub fn short_description(&self) -> Option<&str> {
        self.fields.str("shortDescription")
    }

    /// Site type, e.g. `"course"` or `"project"`.
    pub fn site_type(&self) -> Option<&str> {
        self.fields.str("type")
    }

    pub fn is_course(&self) -> bool {
        self.site_type() == Some("course")
    }

    pub fn owner(&self) -> Option<&str> {
        self.fields.str("owner")
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.fields.str("contactName")
    }

    pub fn contact_email(&self) -> Option<&str> {
        self.fields.str("contactEmail")
    }

    pub fn is_published(&self) -> Option<bool> {
        self.fields.bool("published")
    }

    /// Site properties (`props`).
    pub fn props(&self) -> Option<&Map<String, Value>> {
        self.fields.object("props")
    }

    /// Academic term code from `props.term`.
    pub fn term(&self) -> Option<i64> {
        match self.props()?.get("term")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn created_time(&self) -> Option<DateTime<Local>> {
        self.fields.timestamp("createdTime")
    }

    pub fn modified_time(&self) -> Option<DateTime<Local>> {
        self.fields.timestamp("modifiedTime")
    }

    /// Assignments belonging to this site.
    pub async fn assignments(&self, session: &Session) -> Result<AssignmentCollection> {
        AssignmentCollection::fetch(session, &self.id).await
    }

    /// Members enrolled in this site.
    pub async fn membership(&self, session: &Session) -> Result<MembershipCollection> {
        MembershipCollection::fetch(session, &self.id).await
    }

    /// Gradebook for this site, preferring a cached copy in `cache`.
    pub async fn gradebook(&self, session: &Session, cache: &LocalCache) -> Result<Gradebook> {
        Gradebook::fetch(session, &self.id, cache).await
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title().unwrap_or_default(), self.id)
    }
}

impl Entity for Site {
    const ENTITY_TYPE: &'static str = "site";

    fn from_fields(fields: Fields) -> Result<Self> {
        let id = fields.require_str("id", Self::ENTITY_TYPE)?.to_string();
        Ok(Self { id, fields })
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Query parameters for listing sites.
#[derive(Debug, Clone, Default)]
pub struct SiteListQuery {
    /// Keep only sites whose type is `"course"`.
    pub course_only: bool,
}

impl SiteListQuery {
    pub fn courses() -> Self {
        Self { course_only: true }
    }
}

#[async_trait]
impl Get for Site {
    fn detail_path(id: &str) -> String {
        format!("site/{}.json", urlencoding::encode(id))
    }

    fn not_found(id: &str) -> SakaiError {
        SakaiError::site_not_found(id)
    }
}

#[async_trait]
impl List for Site {
    type Query = SiteListQuery;

    const COLLECTION_KEY: &'static str = "site_collection";
    const PAGINATED: bool = true;

    fn listing_path(_query: &Self::Query) -> String {
        "site.json".to_string()
    }

    fn identity_key(item: &Fields) -> Result<String> {
        Ok(item.require_str("id", Self::ENTITY_TYPE)?.to_string())
    }

    fn accepts(query: &Self::Query, item: &Self) -> bool {
        !query.course_only || item.is_course()
    }
}

/// All sites visible to the session, in first-seen order.
pub type SiteCollection = Collection<Site>;

impl Collection<Site> {
    /// Walk the paginated site listing.
    pub async fn fetch(session: &Session, query: &SiteListQuery) -> Result<Self> {
        Site::list_all(session, query).await
    }

    /// Look up a site by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a site id that is not in the collection.
    pub fn get_site(&self, site_id: &str) -> Result<&Site> {
        self.iter()
            .find(|site| site.id() == site_id)
            .ok_or_else(|| SakaiError::site_not_found(site_id))
    }
}

/// Fetch the academic term code of a site.
pub async fn get_site_term(session: &Session, site_id: &str) -> Result<Option<i64>> {
    Ok(Site::get(session, site_id).await?.term())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site(value: Value) -> Site {
        Site::from_fields(Fields::try_from(value).unwrap()).unwrap()
    }

    #[test]
    fn test_site_accessors() {
        let s = site(json!({
            "id": "SITE-1",
            "title": "Intro to Rust",
            "description": "<p>Ownership</p>",
            "shortDescription": "Ownership",
            "type": "course",
            "owner": "admin",
            "contactName": "Ada",
            "contactEmail": "ada@example.edu",
            "published": true,
            "props": {"term": "202401", "term_eid": "Spring 2024"},
            "createdTime": {"time": 1_700_000_000_000_i64},
            "modifiedTime": {"time": 1_700_000_500_000_i64},
            "joinable": false
        }));

        assert_eq!(s.id(), "SITE-1");
        assert_eq!(s.title(), Some("Intro to Rust"));
        assert_eq!(s.short_description(), Some("Ownership"));
        assert_eq!(s.site_type(), Some("course"));
        assert!(s.is_course());
        assert_eq!(s.owner(), Some("admin"));
        assert_eq!(s.contact_name(), Some("Ada"));
        assert_eq!(s.contact_email(), Some("ada@example.edu"));
        assert_eq!(s.is_published(), Some(true));
        assert_eq!(s.term(), Some(202401));
        assert_eq!(s.created_time().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(s.modified_time().unwrap().timestamp(), 1_700_000_500);
        // Unrecognised fields stay in the raw mapping only.
        assert_eq!(s.fields().raw("joinable"), Some(&json!(false)));
        assert_eq!(s.to_string(), "Intro to Rust (SITE-1)");
    }

    #[test]
    fn test_site_missing_optional_fields() {
        let s = site(json!({"id": "SITE-2"}));
        assert!(s.title().is_none());
        assert!(s.term().is_none());
        assert!(s.created_time().is_none());
        assert!(!s.is_course());
    }

    #[test]
    fn test_site_requires_id() {
        let err = Site::from_fields(Fields::try_from(json!({"title": "x"})).unwrap()).unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn test_site_value_equality() {
        assert_eq!(site(json!({"id": "a", "title": "A"})), site(json!({"id": "a", "title": "A"})));
        assert_ne!(site(json!({"id": "a", "title": "A"})), site(json!({"id": "a", "title": "B"})));
    }

    #[test]
    fn test_detail_path_encodes_id() {
        assert_eq!(Site::detail_path("~admin"), "site/~admin.json");
        assert_eq!(Site::detail_path("a b"), "site/a%20b.json");
    }

    #[test]
    fn test_course_only_filter() {
        let course = site(json!({"id": "c", "type": "course"}));
        let project = site(json!({"id": "p", "type": "project"}));
        assert!(Site::accepts(&SiteListQuery::courses(), &course));
        assert!(!Site::accepts(&SiteListQuery::courses(), &project));
        assert!(Site::accepts(&SiteListQuery::default(), &project));
    }

    #[test]
    fn test_get_site_lookup() {
        let sites = SiteCollection::from_entities([
            site(json!({"id": "s1"})),
            site(json!({"id": "s2"})),
        ])
        .unwrap();
        assert_eq!(sites.get_site("s2").unwrap().id(), "s2");
        assert!(matches!(
            sites.get_site("s9"),
            Err(SakaiError::NotFound { entity_type: "site", .. })
        ));
    }
}
