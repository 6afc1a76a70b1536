//! Per-source request throttling.
//!
//! One shared limiter, keyed by source (one key per platform, or per
//! platform+market when adapters are market-scoped). Counters replenish on
//! a one-minute window. Safe under concurrent access from independent
//! orchestrator runs; share via `Arc`.
//!
//! The backend is in-process (governor), so the fail-open policy for an
//! unreachable shared counter service is satisfied trivially: `allow` can
//! only deny on a genuinely exhausted window.

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Default requests-per-minute budget per source key.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;

/// Time-windowed request budget, tracked per source key.
pub struct SourceRateLimiter {
    limiter: KeyedLimiter,
    max_per_minute: u32,
}

impl SourceRateLimiter {
    /// Create a limiter allowing `max_per_minute` requests per key per minute.
    pub fn new(max_per_minute: u32) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(max_per_minute.max(1)).expect("max_per_minute floor is 1"),
        );
        Self {
            limiter: RateLimiter::keyed(quota),
            max_per_minute: max_per_minute.max(1),
        }
    }

    /// Non-blocking check: consume one unit of budget if available.
    pub fn allow(&self, source_key: &str) -> bool {
        self.limiter.check_key(&source_key.to_string()).is_ok()
    }

    /// Suspend the caller until the key has capacity, then consume one unit.
    ///
    /// Backed by governor's timer wait, not a busy-spin.
    pub async fn await_capacity(&self, source_key: &str) {
        self.limiter
            .until_key_ready(&source_key.to_string())
            .await;
    }

    /// The configured per-minute budget.
    pub fn max_per_minute(&self) -> u32 {
        self.max_per_minute
    }
}

impl Default for SourceRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_budget_then_denies() {
        let limiter = SourceRateLimiter::new(3);

        assert!(limiter.allow("reddit"));
        assert!(limiter.allow("reddit"));
        assert!(limiter.allow("reddit"));
        assert!(!limiter.allow("reddit"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = SourceRateLimiter::new(1);

        assert!(limiter.allow("reddit"));
        assert!(!limiter.allow("reddit"));
        assert!(limiter.allow("quora"));
    }

    #[tokio::test]
    async fn await_capacity_eventually_returns() {
        // Large budget: the wait should resolve immediately.
        let limiter = SourceRateLimiter::new(100);
        limiter.await_capacity("reddit").await;
        assert!(limiter.allow("reddit"));
    }
}
