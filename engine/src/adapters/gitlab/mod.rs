//! GitLab v4 REST adapter.

pub mod client;

pub use client::{GitLabConnector, GitLabHost};
