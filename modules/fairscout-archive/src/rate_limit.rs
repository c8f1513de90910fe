// Per-host request pacing.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::debug;

const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(700);
const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(1200);

/// Spaces consecutive requests to the same host by a random delay in
/// `[min_delay, max_delay]`. Different hosts never wait on each other.
///
/// `acquire` reserves the next slot for the host before sleeping, so
/// concurrent callers queue up instead of all firing after one delay.
pub struct RateLimiter {
    slots: Mutex<HashMap<String, Instant>>,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl RateLimiter {
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            min_delay,
            max_delay: max_delay.max(min_delay),
        }
    }

    /// No pacing at all. For tests and replays.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    fn jitter(&self) -> Duration {
        if self.max_delay == self.min_delay {
            return self.min_delay;
        }
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Wait until `host` may be contacted. Returns how long the caller waited.
    pub async fn acquire(&self, host: &str) -> Duration {
        let now = Instant::now();
        let start = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let start = match slots.get(host) {
                Some(&last) => (last + self.jitter()).max(now),
                None => now,
            };
            slots.insert(host.to_string(), start);
            start
        };

        let waited = start.saturating_duration_since(now);
        if !waited.is_zero() {
            debug!(host, waited_ms = waited.as_millis() as u64, "Rate limit wait");
            tokio::time::sleep_until(start).await;
        }
        waited
    }

    /// Mark a request to `host` as finished; the next delay counts from here.
    pub fn finish(&self, host: &str) {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(host.to_string()).or_insert(now);
        *slot = (*slot).max(now);
    }
}
