//! Gradebook model.
//!
//! The gradebook endpoint returns one flat `assignments` array holding an
//! entry per (gradebook item, student) pair.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{LocalCache, GRADEBOOK};
use crate::error::{Result, SakaiError};
use crate::session::Session;

/// One grade for one user on one gradebook item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookEntry {
    /// Gradebook item (assignment) name.
    #[serde(rename = "itemName")]
    pub assignment_name: String,

    pub user_id: String,

    /// Grade as recorded upstream; usually a string, may be null.
    #[serde(default)]
    pub grade: Value,

    /// Points possible, when the server reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
}

impl GradebookEntry {
    /// The grade rendered as text, or `None` when no grade is recorded.
    pub fn grade_text(&self) -> Option<String> {
        match &self.grade {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn key(&self) -> (&str, &str) {
        (&self.assignment_name, &self.user_id)
    }
}

/// API response wrapper for a site gradebook.
#[derive(Debug, Deserialize)]
struct GradebookResponse {
    assignments: Vec<GradebookEntry>,
}

/// Per-assignment, per-user grades for a site.
///
/// Entries are kept as received. Queries and [`grouped`](Self::grouped)
/// report only the first entry seen for each (assignment, user) pair.
#[derive(Debug, Clone, Serialize)]
pub struct Gradebook {
    site_id: String,
    entries: Vec<GradebookEntry>,
}

impl Gradebook {
    /// Load the gradebook of `site_id`, preferring `{site_id}-gradebook.json`
    /// in `cache` over a network request.
    ///
    /// # Errors
    ///
    /// Returns [`SakaiError::NoGradebook`] when there is no cache file and the
    /// gradebook endpoint answers with a failure status.
    #[tracing::instrument(skip(session, cache))]
    pub async fn fetch(session: &Session, site_id: &str, cache: &LocalCache) -> Result<Self> {
        let data = match cache.load(site_id, GRADEBOOK).await? {
            Some(data) => {
                tracing::debug!("using cached gradebook");
                data
            }
            None => {
                let path = format!("gradebook/site/{}.json", urlencoding::encode(site_id));
                match session.get_json(&path).await {
                    Ok(data) => data,
                    Err(SakaiError::ApiError { status_code, .. }) => {
                        tracing::debug!(?status_code, "gradebook request failed");
                        return Err(SakaiError::NoGradebook {
                            site_id: site_id.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        Self::from_json(site_id, data)
    }

    /// Build a gradebook from a gradebook document.
    pub fn from_json(site_id: &str, data: Value) -> Result<Self> {
        let response: GradebookResponse = serde_json::from_value(data)?;
        Ok(Self::from_entries(site_id, response.assignments))
    }

    pub fn from_entries(site_id: &str, entries: Vec<GradebookEntry>) -> Self {
        Self {
            site_id: site_id.to_string(),
            entries,
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Every entry, exactly as received.
    pub fn entries(&self) -> &[GradebookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with later duplicates of an (assignment, user) pair removed.
    pub fn distinct_entries(&self) -> impl Iterator<Item = &GradebookEntry> {
        let mut seen = HashSet::new();
        self.entries.iter().filter(move |entry| seen.insert(entry.key()))
    }

    /// Distinct assignment names in first-seen order.
    pub fn assignment_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|entry| entry.assignment_name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Grades keyed by assignment name, then user id.
    pub fn grouped(&self) -> BTreeMap<&str, BTreeMap<&str, &Value>> {
        let mut grouped: BTreeMap<&str, BTreeMap<&str, &Value>> = BTreeMap::new();
        for entry in self.distinct_entries() {
            grouped
                .entry(entry.assignment_name.as_str())
                .or_default()
                .insert(entry.user_id.as_str(), &entry.grade);
        }
        grouped
    }

    /// Grades recorded for the gradebook item named exactly `assignment_name`.
    pub fn grades_for_assignment(&self, assignment_name: &str) -> Vec<&GradebookEntry> {
        self.distinct_entries()
            .filter(|entry| entry.assignment_name == assignment_name)
            .collect()
    }

    /// Grades recorded for `user_id`.
    pub fn grades_for_user(&self, user_id: &str) -> Vec<&GradebookEntry> {
        self.distinct_entries()
            .filter(|entry| entry.user_id == user_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gradebook(entries: Value) -> Gradebook {
        Gradebook::from_json("SITE-1", json!({ "assignments": entries })).unwrap()
    }

    #[test]
    fn test_first_seen_grade_wins() {
        let gb = gradebook(json!([
            {"itemName": "HW1", "userId": "u1", "grade": "90"},
            {"itemName": "HW1", "userId": "u1", "grade": "95"},
        ]));

        assert_eq!(gb.len(), 2);
        let grades = gb.grades_for_user("u1");
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].assignment_name, "HW1");
        assert_eq!(grades[0].grade_text().as_deref(), Some("90"));
        assert_eq!(gb.grouped()["HW1"]["u1"], &json!("90"));
    }

    #[test]
    fn test_grouping_and_names() {
        let gb = gradebook(json!([
            {"itemName": "Quiz", "userId": "u2", "grade": "7", "points": 10.0},
            {"itemName": "HW1", "userId": "u1", "grade": "88"},
            {"itemName": "Quiz", "userId": "u1", "grade": null},
            {"itemName": "HW1", "userId": "u2", "grade": 71},
        ]));

        assert_eq!(gb.assignment_names(), ["Quiz", "HW1"]);

        let grouped = gb.grouped();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["Quiz"].len(), 2);
        assert_eq!(grouped["HW1"]["u2"], &json!(71));

        let quiz = gb.grades_for_assignment("Quiz");
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz[0].points, Some(10.0));
        assert_eq!(quiz[1].grade_text(), None);
        assert_eq!(gb.grades_for_assignment("HW1")[1].grade_text().as_deref(), Some("71"));
    }

    #[test]
    fn test_assignment_match_is_case_sensitive() {
        let gb = gradebook(json!([{"itemName": "HW1", "userId": "u1", "grade": "90"}]));
        assert!(gb.grades_for_assignment("hw1").is_empty());
        assert!(gb.grades_for_user("U1").is_empty());
    }

    #[test]
    fn test_malformed_document_is_protocol_error() {
        let err = Gradebook::from_json("SITE-1", json!({"items": []})).unwrap_err();
        assert!(err.is_protocol());

        let err = Gradebook::from_json("SITE-1", json!({"assignments": [{"userId": "u1"}]}))
            .unwrap_err();
        assert!(err.is_protocol());
    }

    #[tokio::test]
    async fn test_cache_file_is_used_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        std::fs::write(
            cache.path_for("SITE-1", GRADEBOOK),
            r#"{"assignments": [{"itemName": "HW1", "userId": "u1", "grade": "A"}]}"#,
        )
        .unwrap();

        let session = Session::new("http://127.0.0.1:9/direct").unwrap();
        let gb = Gradebook::fetch(&session, "SITE-1", &cache).await.unwrap();

        assert_eq!(gb.site_id(), "SITE-1");
        assert_eq!(gb.grades_for_assignment("HW1")[0].grade_text().as_deref(), Some("A"));
    }
}
