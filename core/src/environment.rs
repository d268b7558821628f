//! Injected dependencies that are not storage.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Every time-dependent decision (past events, upcoming listings, derived
/// status) reads "now" through this trait so tests can pin it.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
