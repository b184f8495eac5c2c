//! Assignment model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{Result, SakaiError};
use crate::fields::Fields;
use crate::pagination::Collection;
use crate::session::Session;
use crate::traits::{Entity, Get, List};

/// A gradable item within a site.
///
/// Two assignments are equal iff their ids match.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    fields: Fields,
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Assignment {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.str("title")
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.str("status")
    }

    /// Id of the site the assignment belongs to.
    pub fn context(&self) -> Option<&str> {
        self.fields.str("context")
    }

    pub fn grade_scale(&self) -> Option<&str> {
        self.fields.str("gradeScale")
    }

    pub fn grade_scale_max_points(&self) -> Option<f64> {
        self.fields.f64("gradeScaleMaxPoints")
    }

    pub fn due_time(&self) -> Option<DateTime<Local>> {
        self.fields.timestamp("dueTime")
    }

    pub fn close_time(&self) -> Option<DateTime<Local>> {
        self.fields.timestamp("closeTime")
    }

    pub fn time_last_modified(&self) -> Option<DateTime<Local>> {
        self.fields.timestamp("timeLastModified")
    }

    pub fn is_draft(&self) -> Option<bool> {
        self.fields.bool("draft")
    }

    pub fn is_resubmittable(&self) -> Option<bool> {
        self.fields.bool("allowResubmission")
    }

    pub fn submission_type(&self) -> Option<&str> {
        self.fields.str("submissionType")
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title().unwrap_or(&self.id))
    }
}

impl Entity for Assignment {
    const ENTITY_TYPE: &'static str = "assignment";

    fn from_fields(fields: Fields) -> Result<Self> {
        let id = fields.require_str("id", Self::ENTITY_TYPE)?.to_string();
        Ok(Self { id, fields })
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }
}

#[async_trait]
impl Get for Assignment {
    fn detail_path(id: &str) -> String {
        format!("assignment/item/{}.json", urlencoding::encode(id))
    }

    fn not_found(id: &str) -> SakaiError {
        SakaiError::assignment_not_found(id)
    }
}

#[async_trait]
impl List for Assignment {
    /// Site id.
    type Query = String;

    const COLLECTION_KEY: &'static str = "assignment_collection";
    const PAGINATED: bool = false;

    fn listing_path(site_id: &Self::Query) -> String {
        format!("assignment/site/{}.json", urlencoding::encode(site_id))
    }

    fn identity_key(item: &Fields) -> Result<String> {
        Ok(item.require_str("id", Self::ENTITY_TYPE)?.to_string())
    }

    // The site listing has been seen to include assignments from other
    // sites; keep those whose context names the requested site.
    fn accepts(site_id: &Self::Query, item: &Self) -> bool {
        item.context().map_or(true, |context| context == site_id)
    }
}

/// Assignments of one site, in listing order.
pub type AssignmentCollection = Collection<Assignment>;

impl Collection<Assignment> {
    /// Fetch the assignments of `site_id`.
    pub async fn fetch(session: &Session, site_id: &str) -> Result<Self> {
        Assignment::list_all(session, &site_id.to_string()).await
    }

    /// Look up an assignment by id.
    pub fn get_assignment(&self, assignment_id: &str) -> Result<&Assignment> {
        self.iter()
            .find(|a| a.id() == assignment_id)
            .ok_or_else(|| SakaiError::assignment_not_found(assignment_id))
    }

    /// Look up an assignment by exact (case-sensitive) title.
    pub fn assignment_by_name(&self, name: &str) -> Result<&Assignment> {
        self.iter()
            .find(|a| a.title() == Some(name))
            .ok_or_else(|| SakaiError::assignment_not_found(name))
    }
}

/// Fetch a single assignment by id.
pub async fn get_assignment(session: &Session, assignment_id: &str) -> Result<Assignment> {
    Assignment::get(session, assignment_id).await
}
