//! Local JSON cache files.
//!
//! A cache file named `{site_id}-{kind}.json` (for example
//! `SITE-123-gradebook.json`) pre-populates data for a site and is consulted
//! before any network call. A missing file is not an error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

/// Cache kind for gradebook documents.
pub const GRADEBOOK: &str = "gradebook";

/// Cache kind for membership listings.
pub const MEMBERS: &str = "members";

/// Directory holding `{site_id}-{kind}.json` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCache {
    dir: PathBuf,
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::current_dir()
    }
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache rooted at the process working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, site_id: &str, kind: &str) -> PathBuf {
        self.dir.join(format!("{site_id}-{kind}.json"))
    }

    /// Load the cached document, or `None` if no file exists.
    ///
    /// # Errors
    ///
    /// Returns a cache error if the file exists but cannot be read, and a
    /// protocol error if it is not valid JSON.
    pub async fn load(&self, site_id: &str, kind: &str) -> Result<Option<Value>> {
        let path = self.path_for(site_id, kind);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), "loaded cache file");
        Ok(Some(serde_json::from_str(&contents)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_convention() {
        let cache = LocalCache::new("/var/cache/sakai");
        assert_eq!(
            cache.path_for("SITE-1", GRADEBOOK),
            PathBuf::from("/var/cache/sakai/SITE-1-gradebook.json")
        );
        assert_eq!(LocalCache::default().dir(), Path::new("."));
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        assert!(cache.load("SITE-1", GRADEBOOK).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_and_reject_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());

        std::fs::write(cache.path_for("good", MEMBERS), r#"{"membership_collection": []}"#).unwrap();
        std::fs::write(cache.path_for("bad", MEMBERS), "not json").unwrap();

        let loaded = cache.load("good", MEMBERS).await.unwrap().unwrap();
        assert!(loaded.get("membership_collection").is_some());

        let err = cache.load("bad", MEMBERS).await.unwrap_err();
        assert!(err.is_protocol());
    }
}
