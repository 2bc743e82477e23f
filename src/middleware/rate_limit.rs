//! Per-credential token-bucket rate limiting.
//!
//! A credential with a budget of `N` requests per minute gets a bucket holding
//! at most `max(N / 10, 1)` tokens, refilled continuously at `N / 60` tokens per
//! second. Buckets are created on first use and keep the budget they were
//! created with for the life of the process.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn for_budget(requests_per_minute: u32) -> Self {
        let budget = requests_per_minute.max(1);
        let capacity = f64::from((budget / 10).max(1));

        Self {
            capacity,
            refill_per_sec: f64::from(budget) / 60.0,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    #[cfg(test)]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Take one token, or report how long until one becomes available.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        // tokens and last_refill are written together; a poisoned guard is still consistent
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = f64::min(self.capacity, state.tokens + elapsed * self.refill_per_sec);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            let deficit = 1.0 - state.tokens;
            Err(Duration::from_secs_f64(deficit / self.refill_per_sec))
        }
    }
}

/// Concurrent map of buckets keyed by credential hash.
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: DashMap<String, Arc<TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for `key_hash`, created with `requests_per_minute` if absent.
    ///
    /// Creation goes through the shard's write lock, so concurrent first
    /// requests all end up with the same bucket.
    pub fn bucket(&self, key_hash: &str, requests_per_minute: u32) -> Arc<TokenBucket> {
        if let Some(existing) = self.buckets.get(key_hash) {
            return Arc::clone(existing.value());
        }

        self.buckets
            .entry(key_hash.to_string())
            .or_insert_with(|| Arc::new(TokenBucket::for_budget(requests_per_minute)))
            .value()
            .clone()
    }

    /// Spend one request of the credential's budget.
    ///
    /// Returns the wait until the next token on rejection.
    pub fn check(&self, key_hash: &str, requests_per_minute: u32) -> Result<(), Duration> {
        self.bucket(key_hash, requests_per_minute).try_acquire()
    }
}

/// `Retry-After` value: whole seconds, rounded up, never below 1.
pub fn retry_after_secs(wait: Duration) -> u64 {
    (wait.as_secs_f64().ceil() as u64).max(1)
}
