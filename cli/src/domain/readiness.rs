//! Fixed-count polling policies.

use std::time::Duration;

/// How often and how many times to poll a dependency before giving up.
///
/// Built only through [`PollPolicy::new`], which keeps `attempts` at one or
/// more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    attempts: u32,
    interval: Duration,
}

impl PollPolicy {
    /// Application health endpoint: 60 attempts, 2 s apart.
    pub const APP_HEALTH: Self = Self::new(60, Duration::from_secs(2));
    /// Database accepting connections: 30 attempts, 2 s apart.
    pub const DATABASE: Self = Self::new(30, Duration::from_secs(2));
    /// Application schema migrated: 40 attempts, 3 s apart.
    pub const SCHEMA: Self = Self::new(40, Duration::from_secs(3));
    /// `role` table created by the application: 30 attempts, 2 s apart.
    pub const ROLE_TABLE: Self = Self::new(30, Duration::from_secs(2));
    /// Proxy waiting for its upstream at startup: 30 attempts, 2 s apart.
    pub const PROXY_UPSTREAM: Self = Self::new(30, Duration::from_secs(2));

    #[must_use]
    pub const fn new(attempts: u32, interval: Duration) -> Self {
        let attempts = if attempts == 0 { 1 } else { attempts };
        Self { attempts, interval }
    }

    /// Maximum number of attempts, always at least 1.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Sleep between two consecutive attempts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Worst-case time spent sleeping before the last attempt.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.interval * self.attempts.saturating_sub(1)
    }
}
