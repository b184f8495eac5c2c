//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data. Fixtures are
//! raw JSON objects shaped like the direct API's responses.

use serde_json::{json, Value};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Site Fixtures
    // =========================================================================

    /// Create a minimal site with id, title and type.
    pub fn site(id: &str, title: &str, site_type: &str) -> Value {
        json!({
            "id": id,
            "entityId": id,
            "title": title,
            "type": site_type,
            "published": true,
        })
    }

    /// Create a course site carrying the usual metadata.
    pub fn course_site(id: &str, title: &str, term: &str) -> Value {
        let mut site = Self::site(id, title, "course");
        let extra = json!({
            "description": format!("<p>{title}</p>"),
            "shortDescription": title,
            "owner": "admin",
            "contactName": "Course Admin",
            "contactEmail": "admin@example.edu",
            "props": {"term": term, "term_eid": format!("Term {term}")},
            "createdTime": {"time": 1_700_000_000_000_i64},
            "modifiedTime": {"time": 1_700_500_000_000_i64},
        });
        merge(&mut site, extra);
        site
    }

    // =========================================================================
    // Assignment Fixtures
    // =========================================================================

    /// Create an open, points-scaled assignment in `site_id`.
    pub fn assignment(id: &str, site_id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "entityId": id,
            "context": site_id,
            "title": title,
            "status": "OPEN",
            "draft": false,
            "gradeScale": "SCORE_GRADE_TYPE",
            "gradeScaleMaxPoints": "100",
            "dueTime": {"time": 1_701_000_000_000_i64},
            "closeTime": {"time": 1_701_086_400_000_i64},
            "timeLastModified": {"time": 1_700_000_000_000_i64},
            "allowResubmission": false,
            "submissionType": "TEXT_AND_ATTACHMENT_ASSIGNMENT_SUBMISSION",
        })
    }

    // =========================================================================
    // Membership Fixtures
    // =========================================================================

    /// Create an active membership record.
    pub fn member(user_id: &str, user_eid: &str, name: &str, role: &str) -> Value {
        json!({
            "userId": user_id,
            "userEid": user_eid,
            "userDisplayId": user_eid,
            "userDisplayName": name,
            "entityTitle": name,
            "userEmail": format!("{user_eid}@example.edu"),
            "memberRole": role,
            "active": true,
            "lastLoginTime": 1_700_000_000_000_i64,
        })
    }

    // =========================================================================
    // Gradebook Fixtures
    // =========================================================================

    /// Create a single gradebook entry.
    pub fn grade(item_name: &str, user_id: &str, grade: &str) -> Value {
        json!({
            "itemName": item_name,
            "userId": user_id,
            "grade": grade,
            "points": 100.0,
        })
    }

    /// Wrap entries in a gradebook document.
    pub fn gradebook(site_id: &str, entries: Vec<Value>) -> Value {
        json!({
            "siteId": site_id,
            "assignments": entries,
        })
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Create a default set of test data for common scenarios.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

fn merge(target: &mut Value, extra: Value) {
    if let (Value::Object(target), Value::Object(extra)) = (target, extra) {
        target.extend(extra);
    }
}

/// A complete test scenario with related entities.
pub struct DefaultScenario {
    pub sites: Vec<Value>,
    pub assignments: Vec<(String, Vec<Value>)>,
    pub members: Vec<(String, Vec<Value>)>,
    pub gradebooks: Vec<(String, Value)>,
    pub users: Vec<(String, String)>,
}

impl DefaultScenario {
    /// Login accepted by the default scenario.
    pub const USERNAME: &'static str = "instructor";
    pub const PASSWORD: &'static str = "secret";

    fn new() -> Self {
        let site_id = "SITE-1";

        let sites = vec![
            Fixtures::course_site(site_id, "Intro to Rust", "202401"),
            Fixtures::course_site("SITE-2", "Systems Programming", "202401"),
            Fixtures::site("~instructor", "My Workspace", "myworkspace"),
        ];

        let assignments = vec![(
            site_id.to_string(),
            vec![
                Fixtures::assignment("a-1", site_id, "Homework 1"),
                Fixtures::assignment("a-2", site_id, "Homework 2"),
                // Listed under the site but owned elsewhere.
                Fixtures::assignment("a-9", "SITE-2", "Foreign Assignment"),
            ],
        )];

        let members = vec![(
            site_id.to_string(),
            vec![
                Fixtures::member("u-1", "jdoe", "Jane Doe", "Student"),
                Fixtures::member("u-2", "asmith", "Alan Smith", "Student"),
                Fixtures::member("u-3", "instructor", "Ima Instructor", "Instructor"),
            ],
        )];

        let gradebooks = vec![(
            site_id.to_string(),
            Fixtures::gradebook(
                site_id,
                vec![
                    Fixtures::grade("Homework 1", "u-1", "90"),
                    Fixtures::grade("Homework 1", "u-2", "75"),
                    Fixtures::grade("Homework 2", "u-1", "88"),
                ],
            ),
        )];

        let users = vec![(Self::USERNAME.to_string(), Self::PASSWORD.to_string())];

        Self {
            sites,
            assignments,
            members,
            gradebooks,
            users,
        }
    }
}
