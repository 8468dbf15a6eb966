use std::env;
use std::time::Duration;

use crate::app::RetryPolicy;
use crate::error::EngineError;

/// Engine configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the GitLab instance, e.g. `https://gitlab.example.com`.
    pub host_url: String,
    /// Key material the credential bridge derives its AES key from.
    pub token_key: String,
    /// Records per page requested upstream (1..=100).
    pub per_page: u32,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, EngineError> {
        dotenvy::dotenv().ok();

        let token_key = env::var("TOKEN_KEY")
            .map_err(|_| EngineError::Configuration("TOKEN_KEY must be set".to_string()))?;

        Ok(Config {
            host_url: env::var("GITLAB_URL")
                .unwrap_or_else(|_| "https://gitlab.com".to_string()),
            token_key,
            per_page: parse_var("PER_PAGE", 100)?,
            retry_max_attempts: parse_var("RETRY_MAX_ATTEMPTS", 4)?,
            retry_base_delay_ms: parse_var("RETRY_BASE_DELAY_MS", 500)?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            ..RetryPolicy::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, EngineError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| EngineError::Configuration(format!("{} must be a number", name))),
        Err(_) => Ok(default),
    }
}
