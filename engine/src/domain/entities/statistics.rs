//! Aggregated per-developer activity statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MergeRequestState;

/// Aggregated activity for one developer within one time bucket.
///
/// Every map is ordered, so aggregating the same input set always
/// serializes to the same document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatistics {
    pub developer_id: i64,
    pub username: String,
    pub bucket_start: DateTime<Utc>,
    pub total_events: u64,
    pub total_merge_requests: u64,
    /// Event counts keyed by action name ("opened", "pushed to", ...).
    pub events_by_action: BTreeMap<String, u64>,
    /// Event counts keyed by resource type; push events carry none and are
    /// only reflected in the action counts.
    pub events_by_resource: BTreeMap<String, u64>,
    pub merge_requests_by_state: BTreeMap<MergeRequestState, u64>,
    /// Label frequency over the developer's events and merge requests.
    pub label_counts: BTreeMap<String, u64>,
}

impl IssueStatistics {
    pub(crate) fn empty(developer_id: i64, username: String, bucket_start: DateTime<Utc>) -> Self {
        IssueStatistics {
            developer_id,
            username,
            bucket_start,
            total_events: 0,
            total_merge_requests: 0,
            events_by_action: BTreeMap::new(),
            events_by_resource: BTreeMap::new(),
            merge_requests_by_state: BTreeMap::new(),
            label_counts: BTreeMap::new(),
        }
    }
}
