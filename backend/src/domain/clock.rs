//! Source of "now" for the tracker.
//!
//! There is no background timer anywhere in the tracker. The current day is
//! whatever the clock says at the moment an operation runs.

use chrono::{DateTime, Duration, FixedOffset, Local};
use std::sync::{Arc, Mutex};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_LABEL_FORMAT: &str = "%H:%M";

pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current local calendar date as YYYY-MM-DD
    fn today(&self) -> String {
        self.now().date_naive().format(DATE_FORMAT).to_string()
    }

    /// Date string `days` before today; ledgers keyed before it are stale
    fn date_days_ago(&self, days: u32) -> String {
        (self.now().date_naive() - Duration::days(i64::from(days)))
            .format(DATE_FORMAT)
            .to_string()
    }
}

/// Wall clock in the machine's local timezone
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually driven clock for tests and replays
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<FixedOffset>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Build from an RFC 3339 timestamp such as `2025-01-20T08:00:00+00:00`
    pub fn at(rfc3339: &str) -> anyhow::Result<Self> {
        Ok(Self::new(DateTime::parse_from_rfc3339(rfc3339)?))
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
