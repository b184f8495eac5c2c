//! Authenticated session against a Sakai "direct" endpoint.
//!
//! Owns the HTTP client, base URL and the cookie bag that carries the
//! server-side session. Entity-specific operations are implemented via
//! traits on the model types; they all issue requests through a `&Session`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::{Config, DEFAULT_TIMEOUT};
use crate::error::{Result, SakaiError};

const USER_AGENT: &str = concat!("sakai-direct/", env!("CARGO_PKG_VERSION"));

/// Name of the servlet session cookie issued by Sakai.
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// The credential bag: cookies returned by the login exchange.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieBag(BTreeMap<String, String>);

impl CookieBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value for a `Cookie` request header, or `None` when the bag is empty.
    pub fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl std::fmt::Debug for CookieBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Cookie values are credentials.
        f.debug_set().entries(self.0.keys()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A session with a Sakai server.
///
/// Cloning is cheap; clones share the underlying connection pool and carry
/// a snapshot of the cookie bag.
///
/// # Example
///
/// ```no_run
/// use sakai_direct::Session;
///
/// # async fn example() -> sakai_direct::Result<()> {
/// let mut session = Session::new("https://lms.example.edu/direct")?;
/// session.login("instructor", "secret").await?;
/// assert!(session.is_active_session().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    http: Client,
    base_url: Arc<Url>,
    cookies: CookieBag,
    authenticated_user: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated_user", &self.authenticated_user)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an unauthenticated session for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create an unauthenticated session with a custom transport timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        // Ensure base URL ends with / so relative paths join beneath it
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(SakaiError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            cookies: CookieBag::new(),
            authenticated_user: None,
        })
    }

    /// Create a session from a [`Config`] without logging in.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(&config.url, config.timeout)
    }

    /// Create a session from `SAKAI_*` environment variables without logging in.
    ///
    /// # Errors
    ///
    /// Returns an error if `SAKAI_URL` is not set.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&Config::from_env()?)
    }

    /// Create a session and log in with the configured credentials unless
    /// the server already reports an active session.
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut session = Self::from_config(config)?;
        if let Some((username, password)) = config.credentials() {
            if !session.is_active_session().await? {
                session.login(username, password).await?;
            }
        }
        Ok(session)
    }

    /// Adopt a credential bag obtained elsewhere (e.g. a persisted session).
    #[must_use]
    pub fn with_cookies(mut self, cookies: CookieBag) -> Self {
        self.cookies = cookies;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The current credential bag.
    pub fn cookies(&self) -> &CookieBag {
        &self.cookies
    }

    /// The `JSESSIONID` cookie, if the session holds one.
    pub fn session_id(&self) -> Option<&str> {
        self.cookies.get(SESSION_COOKIE)
    }

    /// Username of the last successful [`login`](Self::login).
    pub fn authenticated_user(&self) -> Option<&str> {
        self.authenticated_user.as_deref()
    }

    /// Authenticate with username and password.
    ///
    /// On success the held cookie bag is replaced by the cookies the server
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`SakaiError::Authentication`] if the server rejects the
    /// credentials or does not issue a session cookie. The previous cookie
    /// bag is left untouched in that case.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let url = self.base_url.join("session")?;
        let form = [("_username", username), ("_password", password)];

        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(SakaiError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::extract_error_message(response, status).await;
            return Err(SakaiError::Authentication { message });
        }

        let cookies: CookieBag = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        if cookies.is_empty() {
            return Err(SakaiError::Authentication {
                message: "server did not issue a session cookie".to_string(),
            });
        }

        tracing::info!(cookies = cookies.len(), "login succeeded");
        self.cookies = cookies;
        self.authenticated_user = Some(username.to_string());
        Ok(())
    }

    /// User id the server associates with this session, if it is active.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the liveness response is not the
    /// expected JSON document.
    #[tracing::instrument(skip(self))]
    pub async fn active_user(&self) -> Result<Option<String>> {
        let data = match self.get_json("session.json").await {
            Ok(data) => data,
            Err(SakaiError::Unauthenticated { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let sessions = data
            .get("session_collection")
            .and_then(Value::as_array)
            .ok_or_else(|| SakaiError::unexpected_shape("missing 'session_collection' array"))?;

        let Some(current) = sessions.first() else {
            return Ok(None);
        };

        let active = current.get("active").and_then(Value::as_bool) == Some(true);
        let user_id = current
            .get("userId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty());

        Ok(user_id.filter(|_| active).map(str::to_string))
    }

    /// True iff the server reports an active session with a user id.
    pub async fn is_active_session(&self) -> Result<bool> {
        Ok(self.active_user().await?.is_some())
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        let mut builder = self.http.request(method, url);
        if let Some(cookie) = self.cookies.header_value() {
            builder = builder.header(COOKIE, cookie);
        }
        Ok(builder)
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        let response = self
            .request(Method::GET, path)?
            .send()
            .await
            .map_err(SakaiError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let response = self
            .request(Method::GET, path)?
            .query(query)
            .send()
            .await
            .map_err(SakaiError::HttpError)?;

        Self::check_response(response).await
    }

    /// GET `path` and parse the body as JSON.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self.get(path).await?;
        Self::parse_json(response).await
    }

    /// GET `path` with query parameters and parse the body as JSON.
    pub async fn get_json_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Value> {
        let response = self.get_with_query(path, query).await?;
        Self::parse_json(response).await
    }

    async fn parse_json(response: Response) -> Result<Value> {
        let body = response.text().await.map_err(SakaiError::HttpError)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SakaiError::Unauthenticated {
                status: status.as_u16(),
            });
        }

        let message = Self::extract_error_message(response, status).await;
        Err(SakaiError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) if !b.trim().is_empty() => b,
            _ => return format!("HTTP {status}"),
        };

        // Try to parse as JSON and extract message field
        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_hides_cookies() {
        let session = Session::new("https://lms.example.edu/direct")
            .unwrap()
            .with_cookies([(SESSION_COOKIE, "secret-session")].into_iter().collect());
        let debug = format!("{:?}", session);
        assert!(debug.contains("Session"));
        assert!(debug.contains("base_url"));
        assert!(!debug.contains("secret-session"));
        assert_eq!(session.session_id(), Some("secret-session"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let a = Session::new("https://lms.example.edu/direct").unwrap();
        let b = Session::new("https://lms.example.edu/direct/").unwrap();
        assert_eq!(a.base_url().as_str(), b.base_url().as_str());
        assert_eq!(
            a.base_url().join("site.json").unwrap().as_str(),
            "https://lms.example.edu/direct/site.json"
        );
    }

    #[test]
    fn test_new_session_is_unauthenticated() {
        let session = Session::new("https://lms.example.edu/direct").unwrap();
        assert!(session.cookies().is_empty());
        assert!(session.session_id().is_none());
        assert!(session.authenticated_user().is_none());
    }

    #[test]
    fn test_cookie_header_value() {
        let mut bag = CookieBag::new();
        assert_eq!(bag.header_value(), None);

        bag.insert("JSESSIONID", "abc");
        bag.insert("SAKAI", "1");
        assert_eq!(bag.header_value().as_deref(), Some("JSESSIONID=abc; SAKAI=1"));
        assert_eq!(format!("{bag:?}"), r#"{"JSESSIONID", "SAKAI"}"#);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            Session::new("not a url"),
            Err(SakaiError::UrlError(_))
        ));
    }
}
