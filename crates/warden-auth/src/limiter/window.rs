//! Sliding window log keyed by arbitrary strings.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use warden_core::config::LimiterConfig;
use warden_core::error::AppError;
use warden_core::traits::Clock;

/// Which limit a key is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitClass {
    /// Requester IP address.
    PerIp,
    /// Canonical email address.
    PerEmail,
}

impl LimitClass {
    /// Label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerIp => "per_ip",
            Self::PerEmail => "per_email",
        }
    }
}

/// Event log for one class.
#[derive(Debug)]
struct ClassWindow {
    window: Duration,
    max: usize,
    /// Key -> admitted event timestamps, oldest first.
    events: DashMap<String, VecDeque<DateTime<Utc>>>,
}

impl ClassWindow {
    fn new(window: Duration, max: usize) -> Self {
        Self {
            window,
            max,
            events: DashMap::new(),
        }
    }
}

/// Drop timestamps that fell out of the window ending at `now`.
fn prune(log: &mut VecDeque<DateTime<Utc>>, cutoff: DateTime<Utc>) {
    while log.front().is_some_and(|ts| *ts < cutoff) {
        log.pop_front();
    }
}

/// Concurrency-safe sliding-window counter.
///
/// Each class keeps a sharded map from key to its event log. The
/// prune-check-record sequence for one key runs under that key's entry
/// guard, so concurrent callers on the same key are serialized while
/// callers on other shards proceed in parallel. Create one per process and
/// share it behind an `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    per_ip: ClassWindow,
    per_email: ClassWindow,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter from configuration. Both classes share the window,
    /// which must be positive and in range.
    pub fn new(config: &LimiterConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let window = config.window()?;
        Ok(Self {
            per_ip: ClassWindow::new(window, config.max_per_ip),
            per_email: ClassWindow::new(window, config.max_per_email),
            clock,
        })
    }

    fn class(&self, class: LimitClass) -> &ClassWindow {
        match class {
            LimitClass::PerIp => &self.per_ip,
            LimitClass::PerEmail => &self.per_email,
        }
    }

    /// Admit and record one event for `key`, or refuse without recording.
    pub fn allow(&self, key: &str, class: LimitClass) -> bool {
        let bucket = self.class(class);
        let now = self.clock.now();
        let cutoff = now - bucket.window;

        let mut log = bucket.events.entry(key.to_string()).or_default();
        prune(&mut log, cutoff);

        if log.len() >= bucket.max {
            debug!(class = class.as_str(), count = log.len(), "Rate limit reached");
            return false;
        }

        log.push_back(now);
        true
    }

    /// Events currently counted for `key`.
    pub fn current_count(&self, key: &str, class: LimitClass) -> usize {
        let bucket = self.class(class);
        let cutoff = self.clock.now() - bucket.window;
        bucket
            .events
            .get(key)
            .map(|log| log.iter().filter(|ts| **ts >= cutoff).count())
            .unwrap_or(0)
    }

    /// Prune every key and evict keys left empty. Returns the number of
    /// evicted keys.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        [&self.per_ip, &self.per_email]
            .into_iter()
            .map(|bucket| {
                let cutoff = now - bucket.window;
                let before = bucket.events.len();
                bucket.events.retain(|_, log| {
                    prune(log, cutoff);
                    !log.is_empty()
                });
                before.saturating_sub(bucket.events.len())
            })
            .sum()
    }

    /// Number of keys currently tracked across both classes.
    pub fn tracked_keys(&self) -> usize {
        self.per_ip.events.len() + self.per_email.events.len()
    }
}
