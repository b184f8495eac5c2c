//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Sakai server.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Sites in listing order.
    pub sites: Vec<Value>,

    /// Assignment listings indexed by site id.
    pub assignments: HashMap<String, Vec<Value>>,

    /// Membership listings indexed by site id.
    pub members: HashMap<String, Vec<Value>>,

    /// Gradebook documents indexed by site id.
    pub gradebooks: HashMap<String, Value>,

    /// Accepted logins: username to password.
    pub users: HashMap<String, String>,

    /// Open sessions: session id to username.
    pub sessions: HashMap<String, String>,

    /// If set, data endpoints answer 403 without a valid session cookie.
    pub require_login: bool,

    /// Every request received, as `METHOD /path?query`.
    pub requests: Vec<String>,

    next_session: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a site to the end of the listing.
    pub fn with_site(mut self, site: Value) -> Self {
        self.sites.push(site);
        self
    }

    /// Add an assignment to a site's listing.
    pub fn with_assignment(mut self, site_id: &str, assignment: Value) -> Self {
        self.assignments
            .entry(site_id.to_string())
            .or_default()
            .push(assignment);
        self
    }

    /// Add a member to a site's membership listing.
    pub fn with_member(mut self, site_id: &str, member: Value) -> Self {
        self.members
            .entry(site_id.to_string())
            .or_default()
            .push(member);
        self
    }

    /// Set the gradebook document of a site.
    pub fn with_gradebook(mut self, site_id: &str, gradebook: Value) -> Self {
        self.gradebooks.insert(site_id.to_string(), gradebook);
        self
    }

    /// Accept a username/password pair at the login endpoint.
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Require a logged-in session for data endpoints.
    pub fn requiring_login(mut self) -> Self {
        self.require_login = true;
        self
    }

    /// Record an incoming request.
    pub fn record(&mut self, request: impl Into<String>) {
        self.requests.push(request.into());
    }

    /// Number of recorded requests whose line starts with `prefix`.
    pub fn request_count(&self, prefix: &str) -> usize {
        self.requests.iter().filter(|r| r.starts_with(prefix)).count()
    }

    /// Get a site by id.
    pub fn get_site(&self, id: &str) -> Option<&Value> {
        self.sites.iter().find(|s| s["id"] == id)
    }

    /// Sites in the window `[start, limit)`.
    pub fn site_window(&self, start: usize, limit: usize) -> Vec<Value> {
        let end = limit.min(self.sites.len());
        if start >= end {
            return vec![];
        }
        self.sites[start..end].to_vec()
    }

    /// Get an assignment by id, searching every site.
    pub fn get_assignment(&self, id: &str) -> Option<&Value> {
        self.assignments.values().flatten().find(|a| a["id"] == id)
    }

    /// Check credentials and open a session, returning its id.
    pub fn login(&mut self, username: &str, password: &str) -> Option<String> {
        if self.users.get(username).map(String::as_str) != Some(password) {
            return None;
        }
        self.next_session += 1;
        let session_id = format!("mock-session-{}", self.next_session);
        self.sessions
            .insert(session_id.clone(), username.to_string());
        Some(session_id)
    }

    /// Username bound to a session id.
    pub fn session_user(&self, session_id: &str) -> Option<&str> {
        self.sessions.get(session_id).map(String::as_str)
    }
}
