//! Unified error types for the GitPulse engine
//!
//! This module defines error types for each layer:
//! - `HostError`: raw upstream API client errors, one page fetch at a time
//! - `EngineError`: errors crossing the crate boundary
//! - `MalformedRecord`: a single record that failed domain conversion

use std::time::Duration;

use thiserror::Error;

/// Upstream API client errors for a single page fetch.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("unauthorized - token rejected upstream")]
    Unauthorized,

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl HostError {
    /// Whether another attempt at the same page can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            HostError::RateLimited { .. } | HostError::Request(_) => true,
            HostError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors crossing the engine boundary.
///
/// The route layer translates these to HTTP statuses via
/// [`EngineError::class`]; upstream response bodies never travel in these
/// variants, so nothing here can echo a token or an internal URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Decryption or integrity failure, or an upstream-rejected credential.
    /// Never retried.
    #[error("invalid token")]
    InvalidToken,

    /// Upstream kept failing after local retries were exhausted.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A page the upstream sent could not be understood.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Missing or invalid request identifiers. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// HTTP-status-equivalent classification for the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 401-equivalent.
    Unauthorized,
    /// 502/503-equivalent.
    UpstreamFailure,
    /// 500-equivalent, reported without detail.
    Internal,
}

impl EngineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            EngineError::InvalidToken => ErrorClass::Unauthorized,
            EngineError::UpstreamUnavailable(_) | EngineError::MalformedPayload(_) => {
                ErrorClass::UpstreamFailure
            }
            EngineError::Configuration(_) => ErrorClass::Internal,
        }
    }
}

/// A single upstream record that could not be converted to a domain value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed record: {0}")]
pub struct MalformedRecord(pub &'static str);
