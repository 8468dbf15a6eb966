//! Aggregation windows and bucket boundaries.

use chrono::{DateTime, Datelike, Days, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Half-open time range `[since, until)` activity is aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Self, EngineError> {
        let window = TimeWindow { since, until };
        window.validate()?;
        Ok(window)
    }

    /// Presence validation for untrusted caller input.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.until <= self.since {
            return Err(EngineError::Configuration(
                "window must end after it starts".to_string(),
            ));
        }
        Ok(())
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.since && ts < self.until
    }
}

/// Bucket size statistics are grouped by, anchored to UTC so results do
/// not depend on the caller's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketGranularity {
    Hourly,
    #[default]
    Daily,
    /// ISO weeks, starting Monday.
    Weekly,
}

impl BucketGranularity {
    /// Start of the bucket `ts` falls into.
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let (date, hour) = match self {
            BucketGranularity::Hourly => (ts.date_naive(), ts.hour()),
            BucketGranularity::Daily => (ts.date_naive(), 0),
            BucketGranularity::Weekly => {
                let date = ts.date_naive();
                let monday =
                    date - Days::new(u64::from(date.weekday().num_days_from_monday()));
                (monday, 0)
            }
        };
        date.and_hms_opt(hour, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            // hour < 24, so the fallback is unreachable
            .unwrap_or(ts)
    }
}
