//! Login throttle for preventing brute force attacks
//!
//! Failed login attempts are counted per account within a sliding window; too
//! many failures bans the key for a while. A successful login clears the
//! counter. State is in-memory only, which is acceptable for a single-process
//! deployment.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Login throttle configuration
#[derive(Debug, Clone)]
pub struct LoginThrottleConfig {
    /// Maximum number of failed attempts allowed
    pub max_failures: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for LoginThrottleConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

#[derive(Debug)]
struct ThrottleEntry {
    failures: u32,
    last_failure: Instant,
    ban_expires: Option<Instant>,
}

/// Per-key login throttle
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    config: LoginThrottleConfig,
    entries: Arc<Mutex<HashMap<String, ThrottleEntry>>>,
}

impl LoginThrottle {
    /// Create a new login throttle
    pub fn new(config: LoginThrottleConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether a login attempt for this key may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let Some(entry) = entries.get_mut(key) else {
            return true;
        };

        if let Some(ban_expires) = entry.ban_expires {
            if now >= ban_expires {
                entry.failures = 0;
                entry.ban_expires = None;
            } else {
                return false;
            }
        }

        if now.duration_since(entry.last_failure) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.failures = 0;
        }

        true
    }

    /// Record a failed attempt; bans the key once the limit is reached
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(ThrottleEntry {
            failures: 0,
            last_failure: now,
            ban_expires: None,
        });

        if now.duration_since(entry.last_failure) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.failures = 0;
        }

        entry.failures += 1;
        entry.last_failure = now;

        if entry.failures >= self.config.max_failures {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Throttling login for key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
        }
    }

    /// Clear the counter after a successful login
    pub async fn record_success(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle(max_failures: u32) -> LoginThrottle {
        LoginThrottle::new(LoginThrottleConfig {
            max_failures,
            window_seconds: 300,
            ban_duration_seconds: 3600,
        })
    }

    #[tokio::test]
    async fn unknown_keys_are_allowed() {
        let throttle = throttle(3);
        assert!(throttle.is_allowed("alice").await);
    }

    #[tokio::test]
    async fn bans_after_too_many_failures() {
        let throttle = throttle(3);
        for _ in 0..3 {
            assert!(throttle.is_allowed("alice").await);
            throttle.record_failure("alice").await;
        }
        assert!(!throttle.is_allowed("alice").await);
        // Other keys are unaffected.
        assert!(throttle.is_allowed("bob").await);
    }

    #[tokio::test]
    async fn success_clears_the_counter() {
        let throttle = throttle(3);
        throttle.record_failure("alice").await;
        throttle.record_failure("alice").await;
        throttle.record_success("alice").await;
        for _ in 0..2 {
            throttle.record_failure("alice").await;
        }
        assert!(throttle.is_allowed("alice").await);
    }
}
