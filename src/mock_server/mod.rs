//! Mock Sakai direct API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Sakai
//! `/direct` API for integration and end-to-end testing. Unlike wiremock which
//! mocks at the HTTP level per-test, this server maintains state across
//! requests: logins open sessions, and later requests are checked against
//! the session cookie.
//!
//! # Example
//!
//! ```ignore
//! use sakai_direct::mock_server::{DefaultScenario, MockServer};
//! use sakai_direct::{Get, Session, Site};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let mut session = Session::new(&server.url()).unwrap();
//!     session
//!         .login(DefaultScenario::USERNAME, DefaultScenario::PASSWORD)
//!         .await
//!         .unwrap();
//!
//!     // Server comes with default fixtures
//!     let site = Site::get(&session, "SITE-1").await.unwrap();
//!     assert_eq!(site.title(), Some("Intro to Rust"));
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::MockState;
