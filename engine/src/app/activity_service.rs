//! Request orchestration
//!
//! Composes the bridge, the host client and the aggregator under a single
//! request's lifetime: decrypt, fetch concurrently, aggregate, snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::GitLabConnector;
use crate::app::{Aggregator, ProjectHostClient, RetryPolicy};
use crate::auth::TokenBridge;
use crate::config::Config;
use crate::domain::entities::{
    BucketGranularity, Developer, IssueStatistics, ProjectRef, TimeWindow,
};
use crate::domain::ports::HostConnector;
use crate::error::EngineError;

/// What a caller asks to have aggregated.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRequest {
    pub project: ProjectRef,
    pub window: TimeWindow,
    #[serde(default)]
    pub granularity: BucketGranularity,
}

impl ActivityRequest {
    /// Presence validation; identifiers arrive from an untrusted caller.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.project.validate()?;
        self.window.validate()
    }
}

/// Immutable result snapshot handed to the boundary layer.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectActivity {
    pub developers: Vec<Developer>,
    pub statistics: Vec<IssueStatistics>,
    /// Records skipped as malformed across all three fetches.
    pub skipped_records: u64,
    pub fetched_at: DateTime<Utc>,
}

/// Orchestrates one request: bridge, client, aggregator, snapshot.
///
/// Holds no per-request state; every call builds its own host around its
/// own decrypted token, so requests are fully isolated from each other.
pub struct ActivityService<C: HostConnector> {
    bridge: TokenBridge,
    connector: Arc<C>,
    retry: RetryPolicy,
}

impl ActivityService<GitLabConnector> {
    /// Wire the production service from environment configuration.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        if config.host_url.trim().is_empty() {
            return Err(EngineError::Configuration(
                "host URL must not be empty".to_string(),
            ));
        }
        let bridge = TokenBridge::from_key_material(&config.token_key)?;
        let connector =
            GitLabConnector::new(config.host_url.clone()).with_per_page(config.per_page);
        Ok(Self::new(bridge, Arc::new(connector), config.retry_policy()))
    }
}

impl<C: HostConnector> ActivityService<C> {
    pub fn new(bridge: TokenBridge, connector: Arc<C>, retry: RetryPolicy) -> Self {
        ActivityService {
            bridge,
            connector,
            retry,
        }
    }

    /// Produce the activity snapshot for one request.
    ///
    /// The decrypted token lives inside the request-scoped host and is
    /// zeroized when this future completes or is dropped, whichever comes
    /// first. The three upstream reads run as siblings; the first failure
    /// cancels the others and propagates unchanged.
    pub async fn project_activity(
        &self,
        encrypted_token: &str,
        request: &ActivityRequest,
    ) -> Result<ProjectActivity, EngineError> {
        request.validate()?;

        let token = self.bridge.decrypt(encrypted_token)?;
        let host = self.connector.connect(token);
        let client = ProjectHostClient::new(host, self.retry.clone());

        let (members, events, merge_requests) = tokio::try_join!(
            client.project_members(&request.project),
            client.collect_events(&request.project, &request.window),
            client.collect_merge_requests(&request.project, &request.window),
        )?;

        let skipped_records = members.skipped + events.skipped + merge_requests.skipped;
        let aggregator = Aggregator::new(request.granularity, request.window);
        let statistics = aggregator.aggregate(events.items, merge_requests.items, &members.items);

        tracing::info!(
            project = %request.project,
            developers = members.items.len(),
            buckets = statistics.len(),
            skipped_records,
            "aggregated project activity"
        );

        Ok(ProjectActivity {
            developers: members.items,
            statistics,
            skipped_records,
            fetched_at: Utc::now(),
        })
    }
}
