//! Mock Sakai direct API server.
//!
//! Provides an axum-based HTTP server that simulates the Sakai `/direct` API.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

/// A mock Sakai direct API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The default scenario requires login with
    /// [`DefaultScenario::USERNAME`] and [`DefaultScenario::PASSWORD`].
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}/direct", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server's direct API.
    ///
    /// Use this URL when creating a `Session` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Number of requests received whose `METHOD /path` line starts with `prefix`.
    pub async fn request_count(&self, prefix: &str) -> usize {
        self.state.read().await.request_count(prefix)
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        let scenario = Fixtures::default_scenario();
        Self::state_from_scenario(scenario)
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new().requiring_login();

        for site in scenario.sites {
            state = state.with_site(site);
        }

        for (site_id, assignments) in scenario.assignments {
            state.assignments.insert(site_id, assignments);
        }

        for (site_id, members) in scenario.members {
            state.members.insert(site_id, members);
        }

        for (site_id, gradebook) in scenario.gradebooks {
            state = state.with_gradebook(&site_id, gradebook);
        }

        for (username, password) in scenario.users {
            state = state.with_user(&username, &password);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Session routes
            .route("/direct/session", post(handlers::login))
            .route("/direct/session.json", get(handlers::current_session))
            // Site routes
            .route("/direct/site.json", get(handlers::list_sites))
            .route("/direct/site/:file", get(handlers::get_site))
            // Assignment routes
            .route(
                "/direct/assignment/site/:file",
                get(handlers::list_site_assignments),
            )
            .route(
                "/direct/assignment/item/:file",
                get(handlers::get_assignment),
            )
            // Membership routes
            .route(
                "/direct/membership/site/:file",
                get(handlers::list_site_members),
            )
            // Gradebook routes
            .route(
                "/direct/gradebook/site/:file",
                get(handlers::get_site_gradebook),
            )
            // Health check
            .route("/direct/health", get(health_check))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                handlers::track_requests,
            ))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Get, Session, Site, SiteCollection, SiteListQuery};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    async fn logged_in(server: &MockServer) -> Session {
        let mut session = Session::new(server.url()).unwrap();
        session
            .login(DefaultScenario::USERNAME, DefaultScenario::PASSWORD)
            .await
            .expect("login against mock server");
        session
    }

    #[tokio::test]
    async fn test_router_health() {
        let app = MockServer::create_router(MockState::new().shared());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/direct/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_rejects_without_session() {
        let app = MockServer::create_router(MockServer::default_state().shared());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/direct/site.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_site_with_session() {
        let server = MockServer::start().await;
        let session = logged_in(&server).await;

        let site = Site::get(&session, "SITE-1")
            .await
            .expect("Failed to get site");

        assert_eq!(site.title(), Some("Intro to Rust"));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_sites_with_session() {
        let server = MockServer::start().await;
        let session = logged_in(&server).await;

        let sites = SiteCollection::fetch(&session, &SiteListQuery::default())
            .await
            .expect("Failed to list sites");

        assert_eq!(sites.len(), 3);
        // One full window plus the terminating empty page.
        assert_eq!(server.request_count("GET /direct/site.json").await, 2);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let session = Session::new(server.url()).unwrap();

        let result = Site::get(&session, "nonexistent").await;

        assert!(result.unwrap_err().is_not_found());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_state() {
        let state = MockState::new().with_site(json!({"id": "s9", "title": "Custom"}));

        let server = MockServer::with_state(state).await;
        let session = Session::new(server.url()).unwrap();

        let site = Site::get(&session, "s9")
            .await
            .expect("Failed to get site");

        assert_eq!(site.title(), Some("Custom"));

        server.shutdown().await;
    }
}
