//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SakaiError};

/// Default transport timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings and credentials for a Sakai instance.
///
/// The base URL points at the "direct" entity broker root, for example
/// `https://lms.example.edu/direct`.
#[derive(Clone)]
pub struct Config {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    pub cache_dir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Configuration for `url` with no credentials and default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
            cache_dir: PathBuf::from("."),
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `SAKAI_URL` (required)
    /// - `SAKAI_USERNAME`, `SAKAI_PASSWORD` (optional)
    /// - `SAKAI_TIMEOUT_SECS` (optional, defaults to 300)
    /// - `SAKAI_CACHE_DIR` (optional, defaults to the working directory)
    ///
    /// # Errors
    ///
    /// Returns an error if `SAKAI_URL` is unset or `SAKAI_TIMEOUT_SECS` is not
    /// a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        let url = env::var("SAKAI_URL").map_err(|_| {
            SakaiError::ConfigMissing("SAKAI_URL environment variable not set".to_string())
        })?;

        let mut config = Self::new(url);
        config.username = env::var("SAKAI_USERNAME").ok();
        config.password = env::var("SAKAI_PASSWORD").ok();

        if let Ok(raw) = env::var("SAKAI_TIMEOUT_SECS") {
            config.timeout = parse_timeout(&raw)?;
        }
        if let Ok(dir) = env::var("SAKAI_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Username and password, if both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

pub(crate) fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            SakaiError::ConfigMissing(format!(
                "SAKAI_TIMEOUT_SECS must be a number of seconds, got '{raw}'"
            ))
        })
}
