//! GitLab API client implementation

use std::time::Duration;

use async_trait::async_trait;
use chrono::Days;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;

use crate::auth::Secret;
use crate::domain::entities::{ProjectRef, TimeWindow};
use crate::domain::ports::{
    EventDto, HostConnector, MemberDto, MergeRequestDto, Page, ProjectHost,
};
use crate::error::HostError;

/// Records per page requested from the upstream API; 100 is the cap.
const DEFAULT_PER_PAGE: u32 = 100;

/// Builds request-scoped [`GitLabHost`]s over one shared connection pool.
#[derive(Clone)]
pub struct GitLabConnector {
    http: Client,
    base_url: String,
    per_page: u32,
}

impl GitLabConnector {
    pub fn new(base_url: String) -> Self {
        GitLabConnector {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }
}

impl HostConnector for GitLabConnector {
    type Host = GitLabHost;

    fn connect(&self, token: Secret) -> GitLabHost {
        GitLabHost {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            per_page: self.per_page,
            token,
        }
    }
}

/// Implementation of the project host port against the GitLab v4 REST API.
///
/// Holds the decrypted token for exactly one request's lifetime; dropping
/// the host zeroizes it.
pub struct GitLabHost {
    http: Client,
    base_url: String,
    per_page: u32,
    token: Secret,
}

impl GitLabHost {
    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    async fn fetch_page(
        &self,
        path: &str,
        query: &[(&str, String)],
        page: u32,
    ) -> Result<(Vec<Value>, Option<u32>), HostError> {
        let url = self.api_url(path);
        tracing::debug!(%url, page, "fetching page");

        let resp = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", self.token.expose())
            .query(query)
            .query(&[
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(HostError::Unauthorized);
        }
        if status.as_u16() == 429 {
            return Err(HostError::RateLimited {
                retry_after: parse_retry_after(resp.headers()),
            });
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(HostError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let next_page = parse_next_page(resp.headers());
        let items: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| HostError::Deserialization(e.to_string()))?;
        Ok((items, next_page))
    }

    /// Parse each record on its own, so one corrupt element cannot poison
    /// the rest of the page.
    fn typed_page<T: serde::de::DeserializeOwned>(
        (items, next_page): (Vec<Value>, Option<u32>),
    ) -> Page<T> {
        let mut malformed = 0;
        let mut typed = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<T>(item) {
                Ok(dto) => typed.push(dto),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unparseable record");
                    malformed += 1;
                }
            }
        }
        Page {
            items: typed,
            next_page,
            malformed,
        }
    }
}

#[async_trait]
impl ProjectHost for GitLabHost {
    async fn members_page(
        &self,
        project: &ProjectRef,
        page: u32,
    ) -> Result<Page<MemberDto>, HostError> {
        let path = format!("/projects/{}/members/all", project.as_path_segment());
        let raw = self.fetch_page(&path, &[], page).await?;
        Ok(Self::typed_page(raw))
    }

    async fn events_page(
        &self,
        project: &ProjectRef,
        window: &TimeWindow,
        page: u32,
    ) -> Result<Page<EventDto>, HostError> {
        let path = format!("/projects/{}/events", project.as_path_segment());
        let (after, before) = event_date_bounds(window);
        let raw = self
            .fetch_page(&path, &[("after", after), ("before", before)], page)
            .await?;
        Ok(Self::typed_page(raw))
    }

    async fn merge_requests_page(
        &self,
        project: &ProjectRef,
        window: &TimeWindow,
        page: u32,
    ) -> Result<Page<MergeRequestDto>, HostError> {
        let path = format!("/projects/{}/merge_requests", project.as_path_segment());
        let query = [
            ("state", "all".to_string()),
            ("updated_after", window.since.to_rfc3339()),
            ("updated_before", window.until.to_rfc3339()),
        ];
        let raw = self.fetch_page(&path, &query, page).await?;
        Ok(Self::typed_page(raw))
    }
}

/// The events endpoint filters by whole dates, exclusive on both ends.
/// Over-fetch a day each side; the aggregator applies the strict window.
fn event_date_bounds(window: &TimeWindow) -> (String, String) {
    let after = window.since.date_naive() - Days::new(1);
    let before = window.until.date_naive() + Days::new(1);
    (after.to_string(), before.to_string())
}

/// Next page cursor from the `x-next-page` header; blank on the last page.
fn parse_next_page(headers: &HeaderMap) -> Option<u32> {
    headers
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

/// Retry delay hint from the `Retry-After` header, in seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
