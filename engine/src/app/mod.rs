//! Application layer
//!
//! Pagination and retry driving, aggregation and request orchestration on
//! top of the domain ports.

pub mod activity_service;
pub mod aggregator;
pub mod host_client;
pub mod retry;

pub use activity_service::{ActivityRequest, ActivityService, ProjectActivity};
pub use aggregator::Aggregator;
pub use host_client::{FetchSummary, PageBatch, ProjectHostClient};
pub use retry::RetryPolicy;
