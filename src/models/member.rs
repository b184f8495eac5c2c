//! Site membership model.
//!
//! Members have no detail endpoint; they only come from the membership
//! listing (or its local cache file).

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::cache::{LocalCache, MEMBERS};
use crate::error::Result;
use crate::fields::Fields;
use crate::pagination::{self, Collection};
use crate::session::Session;
use crate::traits::{Entity, List};

/// A user's enrollment record within a site.
///
/// Two members are equal if their user ids match case-insensitively **or**
/// their user eids do. The relation is not transitive, so `Member` is
/// `PartialEq` only.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    #[serde(skip)]
    user_id: String,
    #[serde(flatten)]
    fields: Fields,
}

fn same_ignoring_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        if same_ignoring_case(&self.user_id, &other.user_id) {
            return true;
        }
        match (self.user_eid(), other.user_eid()) {
            (Some(a), Some(b)) => same_ignoring_case(a, b),
            _ => false,
        }
    }
}

impl Member {
    /// Internal (opaque) user id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// External, human-readable user id (login name).
    pub fn user_eid(&self) -> Option<&str> {
        self.fields.str("userEid")
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.str("entityTitle")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.fields.str("userDisplayName")
    }

    pub fn display_id(&self) -> Option<&str> {
        self.fields.str("userDisplayId")
    }

    pub fn email(&self) -> Option<&str> {
        self.fields.str("userEmail")
    }

    pub fn role(&self) -> Option<&str> {
        self.fields.str("memberRole")
    }

    pub fn is_active(&self) -> Option<bool> {
        self.fields.bool("active")
    }

    pub fn last_login_time(&self) -> Option<DateTime<Local>> {
        self.fields.timestamp("lastLoginTime")
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.name().unwrap_or_default(),
            self.user_eid().unwrap_or(&self.user_id)
        )
    }
}

impl Entity for Member {
    const ENTITY_TYPE: &'static str = "member";

    fn from_fields(fields: Fields) -> Result<Self> {
        let user_id = fields.require_str("userId", Self::ENTITY_TYPE)?.to_string();
        Ok(Self { user_id, fields })
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }
}

#[async_trait]
impl List for Member {
    /// Site id.
    type Query = String;

    const COLLECTION_KEY: &'static str = "membership_collection";
    const PAGINATED: bool = false;

    fn listing_path(site_id: &Self::Query) -> String {
        format!("membership/site/{}.json", urlencoding::encode(site_id))
    }

    fn identity_key(item: &Fields) -> Result<String> {
        Ok(item.require_str("userId", Self::ENTITY_TYPE)?.to_lowercase())
    }
}

/// Members of one site, in listing order.
pub type MembershipCollection = Collection<Member>;

impl Collection<Member> {
    /// Fetch the membership of `site_id`.
    pub async fn fetch(session: &Session, site_id: &str) -> Result<Self> {
        Member::list_all(session, &site_id.to_string()).await
    }

    /// Like [`fetch`](Self::fetch), but use `{site_id}-members.json` from
    /// `cache` when present.
    pub async fn fetch_cached(session: &Session, site_id: &str, cache: &LocalCache) -> Result<Self> {
        let query = site_id.to_string();
        match cache.load(site_id, MEMBERS).await? {
            Some(body) => pagination::collect_from_body(&query, body),
            None => Member::list_all(session, &query).await,
        }
    }

    /// All members whose user id matches, ignoring case.
    pub fn members_by_user_id(&self, user_id: &str) -> Vec<&Member> {
        self.iter()
            .filter(|m| same_ignoring_case(m.user_id(), user_id))
            .collect()
    }

    /// First member whose user id matches, ignoring case.
    pub fn member_by_user_id(&self, user_id: &str) -> Option<&Member> {
        self.iter().find(|m| same_ignoring_case(m.user_id(), user_id))
    }

    /// All members whose user eid matches, ignoring case.
    pub fn members_by_user_eid(&self, user_eid: &str) -> Vec<&Member> {
        self.iter()
            .filter(|m| m.user_eid().is_some_and(|eid| same_ignoring_case(eid, user_eid)))
            .collect()
    }
}
