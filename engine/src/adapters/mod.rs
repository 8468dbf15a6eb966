//! Adapters
//!
//! Concrete implementations of domain ports against external systems.

pub mod gitlab;

pub use gitlab::{GitLabConnector, GitLabHost};
