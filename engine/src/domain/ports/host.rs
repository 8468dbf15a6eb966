//! Project host port trait
//!
//! Defines the page-level interface the engine requires from the upstream
//! project-management API, plus the wire types one page carries. Pagination,
//! retry and backoff all live above this trait; implementations perform
//! exactly one upstream request per call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::auth::Secret;
use crate::domain::entities::{ProjectRef, TimeWindow};
use crate::error::HostError;

/// Helper to deserialize null as default (empty vec, etc.)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a paginated upstream response.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` when the sequence is exhausted.
    pub next_page: Option<u32>,
    /// Records in this page that did not parse at all.
    pub malformed: u64,
}

impl<T> Page<T> {
    /// A terminal page with no malformed records.
    pub fn last(items: Vec<T>) -> Self {
        Page {
            items,
            next_page: None,
            malformed: 0,
        }
    }
}

/// Member entry from the membership listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberDto {
    pub id: Option<i64>,
    pub username: Option<String>,
}

/// Actor reference embedded in events and merge requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRefDto {
    pub id: Option<i64>,
    pub username: Option<String>,
}

/// Activity event entry. Field names follow the upstream wire format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDto {
    pub id: Option<i64>,
    pub author_id: Option<i64>,
    pub action_name: Option<String>,
    pub target_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub label: Option<String>,
    pub assignee: Option<UserRefDto>,
}

/// Merge request entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MergeRequestDto {
    pub id: Option<i64>,
    pub iid: Option<i64>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub labels: Vec<String>,
    pub author: Option<UserRefDto>,
    pub source_project_id: Option<i64>,
}

/// Port trait for page-level access to a project host.
#[async_trait]
pub trait ProjectHost: Send + Sync {
    /// Fetch one page of the project membership list.
    async fn members_page(
        &self,
        project: &ProjectRef,
        page: u32,
    ) -> Result<Page<MemberDto>, HostError>;

    /// Fetch one page of the project activity event feed.
    async fn events_page(
        &self,
        project: &ProjectRef,
        window: &TimeWindow,
        page: u32,
    ) -> Result<Page<EventDto>, HostError>;

    /// Fetch one page of the project merge request listing.
    async fn merge_requests_page(
        &self,
        project: &ProjectRef,
        window: &TimeWindow,
        page: u32,
    ) -> Result<Page<MergeRequestDto>, HostError>;
}

#[async_trait]
impl<H: ProjectHost + ?Sized> ProjectHost for Arc<H> {
    async fn members_page(
        &self,
        project: &ProjectRef,
        page: u32,
    ) -> Result<Page<MemberDto>, HostError> {
        (**self).members_page(project, page).await
    }

    async fn events_page(
        &self,
        project: &ProjectRef,
        window: &TimeWindow,
        page: u32,
    ) -> Result<Page<EventDto>, HostError> {
        (**self).events_page(project, window, page).await
    }

    async fn merge_requests_page(
        &self,
        project: &ProjectRef,
        window: &TimeWindow,
        page: u32,
    ) -> Result<Page<MergeRequestDto>, HostError> {
        (**self).merge_requests_page(project, window, page).await
    }
}

/// Builds a request-scoped host around a freshly decrypted token.
///
/// Each request gets its own host so the token never outlives the request
/// and nothing is shared across requests.
pub trait HostConnector: Send + Sync {
    type Host: ProjectHost;

    fn connect(&self, token: Secret) -> Self::Host;
}
