//! GitPulse engine
//!
//! The token-bridge and activity-aggregation core behind a developer
//! activity dashboard. Decrypts a caller-supplied encrypted GitLab
//! credential, drives paginated, rate-limit-aware reads of project
//! membership, events and merge requests, and folds them into
//! deterministic per-developer statistics.
//! Uses hexagonal (ports & adapters) architecture for clean separation of
//! concerns; the HTTP route layer consuming this crate lives elsewhere.

pub mod adapters;
pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;

#[cfg(test)]
mod test_utils;


pub use adapters::{GitLabConnector, GitLabHost};
pub use app::{
    ActivityRequest, ActivityService, Aggregator, FetchSummary, PageBatch, ProjectActivity,
    ProjectHostClient, RetryPolicy,
};
pub use auth::{Secret, TokenBridge};
pub use config::Config;
pub use domain::entities::{
    ActivityEvent, BucketGranularity, Developer, IssueStatistics, MergeRequestRecord,
    MergeRequestState, ProjectRef, TimeWindow, UNKNOWN_DEVELOPER_ID,
};
pub use domain::ports::{HostConnector, Page, ProjectHost};
pub use error::{EngineError, ErrorClass, HostError};
