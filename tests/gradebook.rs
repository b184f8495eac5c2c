//! Gradebook fetch tests: network, local cache and failure.

use sakai_direct::cache_kind::{GRADEBOOK, MEMBERS};
use sakai_direct::{Gradebook, LocalCache, MembershipCollection, SakaiError, Session};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> Session {
    Session::new(&format!("{}/direct", server.uri())).unwrap()
}

fn empty_cache() -> (TempDir, LocalCache) {
    let dir = TempDir::new().unwrap();
    let cache = LocalCache::new(dir.path());
    (dir, cache)
}

#[tokio::test]
async fn test_fetch_gradebook_from_server() {
    let server = MockServer::start().await;
    let (_dir, cache) = empty_cache();

    Mock::given(method("GET"))
        .and(path("/direct/gradebook/site/SITE-1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "siteId": "SITE-1",
            "assignments": [
                { "itemName": "HW1", "userId": "u1", "grade": "90", "points": 100.0 },
                { "itemName": "HW1", "userId": "u1", "grade": "95", "points": 100.0 },
                { "itemName": "HW1", "userId": "u2", "grade": null },
                { "itemName": "HW2", "userId": "u1", "grade": "A" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gradebook = Gradebook::fetch(&session_for(&server), "SITE-1", &cache)
        .await
        .unwrap();

    assert_eq!(gradebook.len(), 4);
    assert_eq!(gradebook.assignment_names(), vec!["HW1", "HW2"]);

    let u1: Vec<(String, Option<String>)> = gradebook
        .grades_for_user("u1")
        .into_iter()
        .map(|e| (e.assignment_name.clone(), e.grade_text()))
        .collect();
    assert_eq!(
        u1,
        vec![
            ("HW1".to_string(), Some("90".to_string())),
            ("HW2".to_string(), Some("A".to_string())),
        ]
    );

    let hw1 = gradebook.grades_for_assignment("HW1");
    assert_eq!(hw1.len(), 2);
    assert_eq!(hw1[1].grade_text(), None);
}

#[tokio::test]
async fn test_cache_file_is_preferred() {
    let server = MockServer::start().await;
    let (_dir, cache) = empty_cache();

    std::fs::write(
        cache.path_for("SITE-1", GRADEBOOK),
        json!({
            "assignments": [{ "itemName": "Quiz", "userId": "u7", "grade": "10" }]
        })
        .to_string(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let gradebook = Gradebook::fetch(&session_for(&server), "SITE-1", &cache)
        .await
        .unwrap();

    assert_eq!(gradebook.site_id(), "SITE-1");
    assert_eq!(gradebook.grades_for_user("u7")[0].assignment_name, "Quiz");
}

#[tokio::test]
async fn test_missing_gradebook_is_no_gradebook() {
    let server = MockServer::start().await;
    let (_dir, cache) = empty_cache();

    Mock::given(method("GET"))
        .and(path("/direct/gradebook/site/SITE-1.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = Gradebook::fetch(&session_for(&server), "SITE-1", &cache)
        .await
        .unwrap_err();

    match err {
        SakaiError::NoGradebook { site_id } => assert_eq!(site_id, "SITE-1"),
        other => panic!("expected NoGradebook, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthenticated_gradebook_is_not_masked() {
    let server = MockServer::start().await;
    let (_dir, cache) = empty_cache();

    Mock::given(method("GET"))
        .and(path("/direct/gradebook/site/SITE-1.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = Gradebook::fetch(&session_for(&server), "SITE-1", &cache)
        .await
        .unwrap_err();

    assert!(matches!(err, SakaiError::Unauthenticated { status: 401 }));
}

#[tokio::test]
async fn test_corrupt_cache_file_is_protocol_error() {
    let server = MockServer::start().await;
    let (_dir, cache) = empty_cache();

    std::fs::write(cache.path_for("SITE-1", GRADEBOOK), "{ not json").unwrap();

    let err = Gradebook::fetch(&session_for(&server), "SITE-1", &cache)
        .await
        .unwrap_err();

    assert!(err.is_protocol());
}

#[tokio::test]
async fn test_members_cache_file_is_preferred() {
    let server = MockServer::start().await;
    let (_dir, cache) = empty_cache();

    std::fs::write(
        cache.path_for("SITE-1", MEMBERS),
        json!({
            "membership_collection": [
                { "userId": "u1", "userEid": "jdoe" },
                { "userId": "U1", "userEid": "jdoe" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let members = MembershipCollection::fetch_cached(&session_for(&server), "SITE-1", &cache)
        .await
        .unwrap();

    assert_eq!(members.len(), 1);
}
