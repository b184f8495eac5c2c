//! Sakai "direct" API client library.
//!
//! A Rust library for the session-cookie authenticated Sakai entity broker
//! (`/direct`) REST API. Sites, assignments, memberships and gradebooks are
//! exposed as typed views over the JSON the server returns; listings are
//! walked page by page and deduplicated into stable, ordered collections.
//!
//! # Quick Start
//!
//! ```no_run
//! use sakai_direct::{Config, LocalCache, Session, SiteCollection, SiteListQuery};
//!
//! #[tokio::main]
//! async fn main() -> sakai_direct::Result<()> {
//!     // Reads SAKAI_URL, SAKAI_USERNAME and SAKAI_PASSWORD; logs in if needed
//!     let session = Session::connect(&Config::from_env()?).await?;
//!
//!     // Walk the paginated site listing
//!     let sites = SiteCollection::fetch(&session, &SiteListQuery::courses()).await?;
//!     for site in &sites {
//!         println!("{site}");
//!         for assignment in &site.assignments(&session).await? {
//!             println!("\t{assignment}");
//!         }
//!     }
//!
//!     // Grades for one site, preferring a local `{site}-gradebook.json`
//!     let site = sites.get_site("SITE-123")?;
//!     let gradebook = site.gradebook(&session, &LocalCache::current_dir()).await?;
//!     for entry in gradebook.grades_for_assignment("Homework 1") {
//!         println!("{}: {:?}", entry.user_id, entry.grade_text());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Session`] owns the base URL and the cookie bag; every request goes
//!   through it.
//! - [`Entity`] projects a raw [`Fields`] mapping onto a typed view.
//! - [`Get`] fetches one entity from its detail endpoint, or adopts fields a
//!   listing already returned.
//! - [`List`] describes a listing endpoint; [`Collection`] is the ordered,
//!   deduplicated result (first occurrence wins).
//!
//! # Configuration
//!
//! [`Config::from_env`] reads `SAKAI_URL` (required), `SAKAI_USERNAME`,
//! `SAKAI_PASSWORD`, `SAKAI_TIMEOUT_SECS` and `SAKAI_CACHE_DIR`.

mod cache;
mod config;
mod error;
mod fields;
mod models;
mod pagination;
mod session;
mod traits;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use cache::LocalCache;
pub use config::{Config, DEFAULT_TIMEOUT};
pub use error::{ProtocolError, Result, SakaiError};
pub use fields::{to_local_time, Fields};
pub use pagination::{
    collect_paged, collect_single, fetch_page, Collection, PageConfig, PageWindow, PAGE_SIZE,
    SCAN_BOUND,
};
pub use session::{CookieBag, Session, SESSION_COOKIE};

// Re-export traits
pub use traits::{Entity, Get, List};

// Re-export models
pub use models::{
    // Site types
    Site,
    SiteCollection,
    SiteListQuery,
    // Assignment types
    Assignment,
    AssignmentCollection,
    // Membership types
    Member,
    MembershipCollection,
    // Gradebook types
    Gradebook,
    GradebookEntry,
};

// Re-export convenience functions
pub use models::{get_assignment, get_site_term};

/// Cache kinds understood by [`LocalCache`].
pub mod cache_kind {
    pub use crate::cache::{GRADEBOOK, MEMBERS};
}
