//! Paginating, retrying client over a project host.
//!
//! Each resource is exposed as a lazy stream of per-page batches, so a
//! caller that stops reading stops paging. Retries happen per page; pages
//! already yielded are never re-fetched or discarded.

use std::future::Future;

use async_stream::try_stream;
use futures::{pin_mut, Stream, StreamExt};
use tokio::time::sleep;

use crate::app::RetryPolicy;
use crate::domain::entities::{
    ActivityEvent, Developer, MergeRequestRecord, ProjectRef, TimeWindow,
};
use crate::domain::ports::{Page, ProjectHost};
use crate::error::{EngineError, HostError, MalformedRecord};

/// Consecutive unparseable pages tolerated before a resource's pagination
/// is abandoned.
const MAX_MALFORMED_PAGES: u32 = 3;

/// One page worth of converted records.
#[derive(Debug, Clone)]
pub struct PageBatch<T> {
    pub items: Vec<T>,
    /// Records (or whole pages) skipped while producing this batch.
    pub skipped: u64,
}

/// Everything a resource yielded, with its total skip count.
#[derive(Debug, Clone)]
pub struct FetchSummary<T> {
    pub items: Vec<T>,
    pub skipped: u64,
}

/// Drives paginated, rate-limit-aware access to one project host.
///
/// Constructed per request around a request-scoped host; nothing here is
/// shared across requests.
pub struct ProjectHostClient<H: ProjectHost> {
    host: H,
    retry: RetryPolicy,
}

impl<H: ProjectHost> ProjectHostClient<H> {
    pub fn new(host: H, retry: RetryPolicy) -> Self {
        ProjectHostClient { host, retry }
    }

    /// Full membership list for a project.
    pub async fn project_members(
        &self,
        project: &ProjectRef,
    ) -> Result<FetchSummary<Developer>, EngineError> {
        let pages = self.paged(move |page| self.host.members_page(project, page), "members");
        collect(pages).await
    }

    /// Lazy event pages; dropping the stream stops paging.
    pub fn events<'a>(
        &'a self,
        project: &'a ProjectRef,
        window: &'a TimeWindow,
    ) -> impl Stream<Item = Result<PageBatch<ActivityEvent>, EngineError>> + 'a {
        self.paged(
            move |page| self.host.events_page(project, window, page),
            "events",
        )
    }

    /// Lazy merge request pages; dropping the stream stops paging.
    pub fn merge_requests<'a>(
        &'a self,
        project: &'a ProjectRef,
        window: &'a TimeWindow,
    ) -> impl Stream<Item = Result<PageBatch<MergeRequestRecord>, EngineError>> + 'a {
        self.paged(
            move |page| self.host.merge_requests_page(project, window, page),
            "merge_requests",
        )
    }

    /// Drain the event stream for callers that want everything.
    pub async fn collect_events(
        &self,
        project: &ProjectRef,
        window: &TimeWindow,
    ) -> Result<FetchSummary<ActivityEvent>, EngineError> {
        collect(self.events(project, window)).await
    }

    /// Drain the merge request stream.
    pub async fn collect_merge_requests(
        &self,
        project: &ProjectRef,
        window: &TimeWindow,
    ) -> Result<FetchSummary<MergeRequestRecord>, EngineError> {
        collect(self.merge_requests(project, window)).await
    }

    /// Pagination driver shared by all three resources: fetch a page with
    /// retries, convert its records, skip what does not parse.
    fn paged<'a, D, T, F, Fut>(
        &'a self,
        fetch: F,
        resource: &'static str,
    ) -> impl Stream<Item = Result<PageBatch<T>, EngineError>> + 'a
    where
        D: 'a,
        T: TryFrom<D, Error = MalformedRecord> + 'a,
        F: Fn(u32) -> Fut + 'a,
        Fut: Future<Output = Result<Page<D>, HostError>> + 'a,
    {
        try_stream! {
            let mut next = Some(1u32);
            let mut malformed_pages = 0u32;

            while let Some(page) = next {
                match self.fetch_with_retry(&fetch, page).await {
                    Ok(raw) => {
                        malformed_pages = 0;
                        next = raw.next_page;

                        let mut skipped = raw.malformed;
                        let mut items = Vec::with_capacity(raw.items.len());
                        for dto in raw.items {
                            match T::try_from(dto) {
                                Ok(item) => items.push(item),
                                Err(e) => {
                                    tracing::warn!(resource, error = %e, "skipping record");
                                    skipped += 1;
                                }
                            }
                        }
                        yield PageBatch { items, skipped };
                    }
                    Err(EngineError::MalformedPayload(reason)) => {
                        // The numeric cursor still lets us move past an
                        // unparseable body, up to a bounded run of them.
                        malformed_pages += 1;
                        if malformed_pages >= MAX_MALFORMED_PAGES {
                            tracing::warn!(
                                resource,
                                pages = malformed_pages,
                                "abandoning pagination after consecutive unparseable pages"
                            );
                            break;
                        }
                        tracing::warn!(resource, page, %reason, "skipping unparseable page");
                        next = Some(page + 1);
                        yield PageBatch { items: Vec::new(), skipped: 1 };
                    }
                    Err(e) => Err(e)?,
                }
            }
        }
    }

    async fn fetch_with_retry<D, F, Fut>(&self, fetch: &F, page: u32) -> Result<Page<D>, EngineError>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<Page<D>, HostError>>,
    {
        let mut attempt = 0u32;
        loop {
            match fetch(page).await {
                Ok(fetched) => return Ok(fetched),
                // Retrying cannot fix a rejected credential
                Err(HostError::Unauthorized) => return Err(EngineError::InvalidToken),
                Err(HostError::Deserialization(reason)) => {
                    return Err(EngineError::MalformedPayload(reason));
                }
                Err(HostError::Api { status: 404, .. }) => {
                    return Err(EngineError::Configuration(
                        "project not found upstream".to_string(),
                    ));
                }
                Err(e) if e.is_transient() && attempt + 1 < self.retry.max_attempts => {
                    let hint = match &e {
                        HostError::RateLimited { retry_after } => *retry_after,
                        _ => None,
                    };
                    let wait = self.retry.delay(attempt, hint);
                    tracing::debug!(
                        page,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "retrying page fetch"
                    );
                    sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(page, attempts = attempt + 1, error = %e, "upstream fetch failed");
                    return Err(EngineError::UpstreamUnavailable(format!(
                        "page fetch failed after {} attempt(s)",
                        attempt + 1
                    )));
                }
            }
        }
    }
}

async fn collect<T>(
    pages: impl Stream<Item = Result<PageBatch<T>, EngineError>>,
) -> Result<FetchSummary<T>, EngineError> {
    pin_mut!(pages);
    let mut summary = FetchSummary {
        items: Vec::new(),
        skipped: 0,
    };
    while let Some(batch) = pages.next().await {
        let batch = batch?;
        summary.skipped += batch.skipped;
        summary.items.extend(batch.items);
    }
    Ok(summary)
}
