//! Activity aggregation
//!
//! Folds raw events and merge requests into per-developer, per-bucket
//! statistics. The fold is pure and commutative: pages may arrive in any
//! order, and a page consumed twice changes nothing, because records
//! deduplicate by id before counting.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    ActivityEvent, BucketGranularity, Developer, IssueStatistics, MergeRequestRecord, TimeWindow,
};

/// Folds raw activity into [`IssueStatistics`].
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    granularity: BucketGranularity,
    window: TimeWindow,
}

impl Aggregator {
    pub fn new(granularity: BucketGranularity, window: TimeWindow) -> Self {
        Aggregator {
            granularity,
            window,
        }
    }

    /// Aggregate events and merge requests against the membership list.
    ///
    /// Actor ids outside the membership attribute to
    /// [`Developer::unknown`]. Events outside the window are ignored;
    /// merge requests bucket by their creation time. Output is sorted by
    /// `(developer_id, bucket_start)`.
    pub fn aggregate(
        &self,
        events: impl IntoIterator<Item = ActivityEvent>,
        merge_requests: impl IntoIterator<Item = MergeRequestRecord>,
        developers: &[Developer],
    ) -> Vec<IssueStatistics> {
        let by_id: HashMap<i64, &Developer> = developers.iter().map(|d| (d.id, d)).collect();
        let unknown = Developer::unknown();

        let mut buckets: BTreeMap<(i64, DateTime<Utc>), IssueStatistics> = BTreeMap::new();
        let mut seen_events: HashSet<i64> = HashSet::new();
        let mut seen_merge_requests: HashSet<i64> = HashSet::new();

        for event in events {
            if !self.window.contains(event.created_at) || !seen_events.insert(event.id) {
                continue;
            }
            let developer = by_id.get(&event.author_id).copied().unwrap_or(&unknown);
            let stats = bucket_entry(
                &mut buckets,
                developer,
                self.granularity.bucket_start(event.created_at),
            );

            stats.total_events += 1;
            *stats.events_by_action.entry(event.action).or_insert(0) += 1;
            if let Some(resource) = event.resource_type {
                *stats.events_by_resource.entry(resource).or_insert(0) += 1;
            }
            if let Some(label) = event.label {
                *stats.label_counts.entry(label).or_insert(0) += 1;
            }
        }

        for merge_request in merge_requests {
            if !seen_merge_requests.insert(merge_request.id) {
                continue;
            }
            let developer = by_id
                .get(&merge_request.author_id)
                .copied()
                .unwrap_or(&unknown);
            let stats = bucket_entry(
                &mut buckets,
                developer,
                self.granularity.bucket_start(merge_request.created_at),
            );

            stats.total_merge_requests += 1;
            *stats
                .merge_requests_by_state
                .entry(merge_request.state)
                .or_insert(0) += 1;
            for label in merge_request.labels {
                *stats.label_counts.entry(label).or_insert(0) += 1;
            }
        }

        buckets.into_values().collect()
    }
}

fn bucket_entry<'a>(
    buckets: &'a mut BTreeMap<(i64, DateTime<Utc>), IssueStatistics>,
    developer: &Developer,
    bucket_start: DateTime<Utc>,
) -> &'a mut IssueStatistics {
    buckets
        .entry((developer.id, bucket_start))
        .or_insert_with(|| {
            IssueStatistics::empty(developer.id, developer.username.clone(), bucket_start)
        })
}
