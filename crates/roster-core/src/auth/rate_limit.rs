//! Failed-login tracking per rate-limit key.
//!
//! Records live in a [`DashMap`], so every mutation of a single key runs
//! under that key's shard lock and no lock spans the whole table. Expired
//! records are dropped lazily when touched; [`LoginRateLimiter::purge_expired`]
//! exists for memory hygiene but correctness never depends on it.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

/// Thresholds for the login rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    60
}

/// Consecutive failures for one key and the moment the record lapses.
///
/// `reset_at` is `None` when the window reaches past the last representable
/// `SystemTime`; such a record never lapses on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    pub count: u32,
    pub reset_at: Option<SystemTime>,
}

impl AttemptRecord {
    fn is_expired(&self, now: SystemTime) -> bool {
        self.reset_at.is_some_and(|reset_at| now > reset_at)
    }
}

/// Tracks failed authentication attempts and decides when a key is blocked.
///
/// A key is blocked once its live count reaches `max_attempts`. With the
/// default of 5, the fifth failure still reports a credential error and the
/// sixth attempt is the first one refused.
pub struct LoginRateLimiter {
    attempts: DashMap<String, AttemptRecord>,
    max_attempts: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl LoginRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts: config.max_attempts.max(1),
            window: config.window(),
            clock,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns `true` if `key` has a live record at or above the threshold.
    pub fn is_blocked(&self, key: &str) -> bool {
        let now = self.clock.now();
        if self
            .attempts
            .remove_if(key, |_, record| record.is_expired(now))
            .is_some()
        {
            tracing::debug!("Rate-limit record expired: key={key}");
            return false;
        }

        self.attempts
            .get(key)
            .is_some_and(|record| record.count >= self.max_attempts)
    }

    /// Counts one failure for `key`.
    ///
    /// A missing or expired record is replaced by a fresh window with a
    /// count of one; a live record is incremented and keeps its deadline.
    pub fn record_attempt(&self, key: &str) {
        let now = self.clock.now();
        let fresh = AttemptRecord {
            count: 1,
            reset_at: now.checked_add(self.window),
        };

        let count = match self.attempts.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_expired(now) {
                    *record = fresh;
                } else {
                    record.count = record.count.saturating_add(1);
                }
                record.count
            }
            Entry::Vacant(vacant) => vacant.insert(fresh).count,
        };

        if count >= self.max_attempts {
            tracing::warn!("Login attempts exhausted: key={key}, count={count}");
        } else {
            tracing::debug!("Login attempt recorded: key={key}, count={count}");
        }
    }

    /// Forgets every failure recorded for `key`.
    pub fn reset_attempts(&self, key: &str) {
        if self.attempts.remove(key).is_some() {
            tracing::debug!("Rate-limit record cleared: key={key}");
        }
    }

    /// The live failure count for `key` (zero when absent or expired).
    pub fn attempts(&self, key: &str) -> u32 {
        let now = self.clock.now();
        self.attempts
            .get(key)
            .filter(|record| !record.is_expired(now))
            .map_or(0, |record| record.count)
    }

    /// Drops every expired record and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.attempts.len();
        self.attempts.retain(|_, record| !record.is_expired(now));
        let removed = before.saturating_sub(self.attempts.len());
        if removed > 0 {
            tracing::debug!("Purged {removed} expired rate-limit records");
        }
        removed
    }

    pub fn tracked_keys(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::thread;

    fn limiter(max_attempts: u32, window_secs: u64) -> (LoginRateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let config = RateLimitConfig {
            max_attempts,
            window_secs,
        };
        (LoginRateLimiter::with_clock(&config, clock.clone()), clock)
    }

    #[test]
    fn unknown_key_is_not_blocked() {
        let (limiter, _) = limiter(5, 60);
        assert!(!limiter.is_blocked("alice"));
        assert_eq!(limiter.attempts("alice"), 0);
    }

    #[test]
    fn blocks_at_threshold() {
        let (limiter, _) = limiter(5, 60);
        for _ in 0..4 {
            limiter.record_attempt("alice");
        }
        assert!(!limiter.is_blocked("alice"));

        limiter.record_attempt("alice");
        assert!(limiter.is_blocked("alice"));
        assert_eq!(limiter.attempts("alice"), 5);
    }

    #[test]
    fn keys_are_independent() {
        let (limiter, _) = limiter(2, 60);
        limiter.record_attempt("alice");
        limiter.record_attempt("alice");
        assert!(limiter.is_blocked("alice"));
        assert!(!limiter.is_blocked("bob"));
    }

    #[test]
    fn reset_unblocks() {
        let (limiter, _) = limiter(3, 60);
        for _ in 0..10 {
            limiter.record_attempt("alice");
        }
        assert!(limiter.is_blocked("alice"));

        limiter.reset_attempts("alice");
        assert!(!limiter.is_blocked("alice"));
        assert_eq!(limiter.attempts("alice"), 0);
    }

    #[test]
    fn expired_record_is_not_blocked_and_is_purged() {
        let (limiter, clock) = limiter(2, 60);
        limiter.record_attempt("alice");
        limiter.record_attempt("alice");
        assert!(limiter.is_blocked("alice"));

        clock.advance(Duration::from_secs(61));
        assert!(!limiter.is_blocked("alice"));
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn record_at_exact_deadline_is_still_live() {
        let (limiter, clock) = limiter(1, 60);
        limiter.record_attempt("alice");
        clock.advance(Duration::from_secs(60));
        assert!(limiter.is_blocked("alice"));
    }

    #[test]
    fn oversized_window_never_lapses() {
        let (limiter, clock) = limiter(2, u64::MAX);
        limiter.record_attempt("alice");
        limiter.record_attempt("alice");
        assert!(limiter.is_blocked("alice"));

        clock.advance(Duration::from_secs(10 * 365 * 24 * 3600));
        assert!(limiter.is_blocked("alice"));
        assert_eq!(limiter.purge_expired(), 0);
    }

    #[test]
    fn attempt_after_expiry_starts_fresh_window() {
        let (limiter, clock) = limiter(5, 60);
        for _ in 0..5 {
            limiter.record_attempt("alice");
        }
        clock.advance(Duration::from_secs(61));

        limiter.record_attempt("alice");
        assert_eq!(limiter.attempts("alice"), 1);
        assert!(!limiter.is_blocked("alice"));

        // The fresh window runs from the new failure, not the old deadline.
        clock.advance(Duration::from_secs(59));
        assert_eq!(limiter.attempts("alice"), 1);
    }

    #[test]
    fn increment_keeps_original_deadline() {
        let (limiter, clock) = limiter(5, 60);
        limiter.record_attempt("alice");
        clock.advance(Duration::from_secs(50));
        limiter.record_attempt("alice");
        assert_eq!(limiter.attempts("alice"), 2);

        clock.advance(Duration::from_secs(11));
        assert_eq!(limiter.attempts("alice"), 0);
    }

    #[test]
    fn purge_expired_removes_only_stale_records() {
        let (limiter, clock) = limiter(5, 60);
        limiter.record_attempt("old");
        clock.advance(Duration::from_secs(40));
        limiter.record_attempt("new");
        clock.advance(Duration::from_secs(30));

        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert_eq!(limiter.attempts("new"), 1);
    }

    #[test]
    fn zero_max_attempts_is_clamped_to_one() {
        let (limiter, _) = limiter(0, 60);
        assert_eq!(limiter.max_attempts(), 1);
        limiter.record_attempt("alice");
        assert!(limiter.is_blocked("alice"));
    }

    #[test]
    fn concurrent_attempts_are_all_counted() {
        const THREADS: u32 = 64;
        let (limiter, _) = limiter(u32::MAX, 600);
        let limiter = Arc::new(limiter);
        let barrier = Arc::new(std::sync::Barrier::new(THREADS as usize));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let limiter = limiter.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    limiter.record_attempt("shared");
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(limiter.attempts("shared"), THREADS);
    }

    #[test]
    fn concurrent_mixed_operations_do_not_deadlock() {
        let (limiter, _) = limiter(3, 600);
        let limiter = Arc::new(limiter);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let limiter = limiter.clone();
                thread::spawn(move || {
                    let key = format!("user-{}", i % 4);
                    for _ in 0..200 {
                        limiter.record_attempt(&key);
                        let _ = limiter.is_blocked(&key);
                        if i % 3 == 0 {
                            limiter.reset_attempts(&key);
                        }
                        let _ = limiter.purge_expired();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(limiter.tracked_keys() <= 4);
    }
}
