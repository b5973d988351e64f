//! Rate limiter for preventing brute-force login attempts
//!
//! Keys are `email:ip` pairs. Failed attempts within the window count
//! toward the limit; a successful login clears the key. Once the limit is
//! reached the key is locked out for the configured duration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of failed attempts allowed within the window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub lockout_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,   // 5 minutes
            lockout_seconds: 3600, // 1 hour
        }
    }
}

/// Per-key attempt tracking
#[derive(Debug)]
struct RateLimiterEntry {
    /// Failed attempts in the current window
    failures: u32,
    /// Time of the most recent failure
    last_failure: Instant,
    /// Lockout expiration time
    locked_until: Option<Instant>,
}

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether a login attempt for `key` may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let Some(entry) = entries.get_mut(key) else {
            return true;
        };

        if let Some(locked_until) = entry.locked_until {
            if now < locked_until {
                return false;
            }
            // Lockout expired
            entry.failures = 0;
            entry.locked_until = None;
        }

        if now.duration_since(entry.last_failure) >= Duration::from_secs(self.config.window_seconds)
        {
            // Window expired
            entry.failures = 0;
        }

        entry.failures < self.config.max_attempts
    }

    /// Record a failed attempt for `key`, locking it out once the limit is
    /// reached
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            failures: 0,
            last_failure: now,
            locked_until: None,
        });

        if now.duration_since(entry.last_failure) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.failures = 0;
        }

        entry.failures += 1;
        entry.last_failure = now;

        if entry.failures >= self.config.max_attempts {
            entry.locked_until = Some(now + Duration::from_secs(self.config.lockout_seconds));
            warn!(
                "Locked out key {} for {} seconds",
                key, self.config.lockout_seconds
            );
        }
    }

    /// Clear the record for `key` after a successful login
    pub async fn reset(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window_seconds: 300,
            lockout_seconds: 3600,
        })
    }

    #[tokio::test]
    async fn test_allows_until_limit() {
        let limiter = limiter(3);
        let key = "user@terrasol.example:127.0.0.1";

        for _ in 0..2 {
            assert!(limiter.is_allowed(key).await);
            limiter.record_failure(key).await;
        }

        assert!(limiter.is_allowed(key).await);
        limiter.record_failure(key).await;

        // Third failure reaches the limit and locks the key out
        assert!(!limiter.is_allowed(key).await);
    }

    #[tokio::test]
    async fn test_reset_clears_failures() {
        let limiter = limiter(2);
        let key = "user@terrasol.example:127.0.0.1";

        limiter.record_failure(key).await;
        limiter.record_failure(key).await;
        assert!(!limiter.is_allowed(key).await);

        limiter.reset(key).await;
        assert!(limiter.is_allowed(key).await);
    }

    #[tokio::test]
    async fn test_unknown_key_is_allowed() {
        let limiter = limiter(1);
        assert!(limiter.is_allowed("never-seen").await);
    }
}
