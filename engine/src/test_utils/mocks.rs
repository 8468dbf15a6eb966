//! Mock implementations of port traits
//!
//! In-memory implementations that can be scripted for testing: fixed page
//! sequences per resource, injectable one-shot failures, call counting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::Secret;
use crate::domain::entities::{ProjectRef, TimeWindow};
use crate::domain::ports::{
    EventDto, HostConnector, MemberDto, MergeRequestDto, Page, ProjectHost,
};
use crate::error::HostError;

/// Upstream calls observed per resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub members: u32,
    pub events: u32,
    pub merge_requests: u32,
}

/// Scripted in-memory project host.
///
/// Pages are indexed from 1 like the upstream API; asking past the script
/// returns an empty terminal page.
#[derive(Default)]
pub struct MockProjectHost {
    members: Vec<Page<MemberDto>>,
    events: Vec<Page<EventDto>>,
    merge_requests: Vec<Page<MergeRequestDto>>,
    /// Failures consumed before a page's scripted result, keyed by
    /// (resource, page).
    failures: Mutex<HashMap<(&'static str, u32), Vec<HostError>>>,
    calls: Mutex<CallCounts>,
}

impl MockProjectHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member_pages(mut self, pages: Vec<Page<MemberDto>>) -> Self {
        self.members = pages;
        self
    }

    pub fn with_event_pages(mut self, pages: Vec<Page<EventDto>>) -> Self {
        self.events = pages;
        self
    }

    pub fn with_merge_request_pages(mut self, pages: Vec<Page<MergeRequestDto>>) -> Self {
        self.merge_requests = pages;
        self
    }

    /// Queue a failure returned before the page's scripted result. Queued
    /// failures for the same page are consumed in order.
    pub fn fail_once(self, resource: &'static str, page: u32, error: HostError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry((resource, page))
            .or_default()
            .push(error);
        self
    }

    pub fn calls(&self) -> CallCounts {
        *self.calls.lock().unwrap()
    }

    fn take_failure(&self, resource: &'static str, page: u32) -> Option<HostError> {
        let mut failures = self.failures.lock().unwrap();
        let queue = failures.get_mut(&(resource, page))?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }

    fn page_at<T: Clone>(pages: &[Page<T>], page: u32) -> Page<T> {
        pages
            .get((page as usize).saturating_sub(1))
            .cloned()
            .unwrap_or_else(|| Page::last(Vec::new()))
    }
}

#[async_trait]
impl ProjectHost for MockProjectHost {
    async fn members_page(
        &self,
        _project: &ProjectRef,
        page: u32,
    ) -> Result<Page<MemberDto>, HostError> {
        self.calls.lock().unwrap().members += 1;
        if let Some(error) = self.take_failure("members", page) {
            return Err(error);
        }
        Ok(Self::page_at(&self.members, page))
    }

    async fn events_page(
        &self,
        _project: &ProjectRef,
        _window: &TimeWindow,
        page: u32,
    ) -> Result<Page<EventDto>, HostError> {
        self.calls.lock().unwrap().events += 1;
        if let Some(error) = self.take_failure("events", page) {
            return Err(error);
        }
        Ok(Self::page_at(&self.events, page))
    }

    async fn merge_requests_page(
        &self,
        _project: &ProjectRef,
        _window: &TimeWindow,
        page: u32,
    ) -> Result<Page<MergeRequestDto>, HostError> {
        self.calls.lock().unwrap().merge_requests += 1;
        if let Some(error) = self.take_failure("merge_requests", page) {
            return Err(error);
        }
        Ok(Self::page_at(&self.merge_requests, page))
    }
}

/// Connector handing out one shared mock host, recording the plaintext of
/// every token it is given.
pub struct MockHostConnector {
    pub host: Arc<MockProjectHost>,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl MockHostConnector {
    pub fn new(host: MockProjectHost) -> Self {
        MockHostConnector {
            host: Arc::new(host),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }
}

impl HostConnector for MockHostConnector {
    type Host = Arc<MockProjectHost>;

    fn connect(&self, token: Secret) -> Arc<MockProjectHost> {
        self.tokens_seen
            .lock()
            .unwrap()
            .push(token.expose().to_string());
        Arc::clone(&self.host)
    }
}
