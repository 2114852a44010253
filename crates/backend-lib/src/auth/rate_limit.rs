// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Lockout for repeated failed logins.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::config::LoginThrottleSettings;

/// Entry in the throttle map
#[derive(Debug, Clone)]
struct ThrottleEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires
    lockout_expiry: Option<Instant>,
}

/// Failed-login tracker keyed by the exact username, matching the store's
/// case-sensitive uniqueness
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    attempts: Arc<DashMap<String, ThrottleEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::from_settings(&LoginThrottleSettings::default())
    }
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    pub fn from_settings(settings: &LoginThrottleSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.lockout_secs),
        )
    }

    fn key(username: &str) -> String {
        username.trim().to_string()
    }

    /// Record a failed login attempt
    pub fn record_failed_attempt(&self, username: &str) {
        let now = Instant::now();

        let mut entry = self
            .attempts
            .entry(Self::key(username))
            .or_insert_with(|| ThrottleEntry {
                failed_attempts: 0,
                last_failure: now,
                lockout_expiry: None,
            });

        // Reset if lockout has expired
        if entry.lockout_expiry.is_some_and(|expiry| now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            tracing::warn!(
                username,
                attempts = entry.failed_attempts,
                "login locked out after repeated failures"
            );
        }
    }

    /// Record a successful login
    pub fn record_success(&self, username: &str) {
        self.attempts.remove(&Self::key(username));
    }

    /// Check if a username may attempt to log in
    pub fn check(&self, username: &str) -> bool {
        match self.attempts.get(&Self::key(username)) {
            Some(entry) => !entry
                .lockout_expiry
                .is_some_and(|expiry| Instant::now() < expiry),
            None => true,
        }
    }

    /// Clean up expired lockouts and stale failure records
    pub fn cleanup(&self) {
        let now = Instant::now();

        self.attempts.retain(|_, entry| match entry.lockout_expiry {
            Some(expiry) => now < expiry,
            // keep failure records for a day
            None => now.duration_since(entry.last_failure) < Duration::from_secs(24 * 60 * 60),
        });
    }

    /// Spawn a background task that periodically runs [`Self::cleanup`]
    pub fn spawn_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        let throttle = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let before = throttle.attempts.len();
                throttle.cleanup();
                let removed = before.saturating_sub(throttle.attempts.len());
                if removed > 0 {
                    tracing::debug!(removed, "swept login throttle records");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockout_after_max_attempts() {
        let throttle = LoginThrottle::new(3, Duration::from_secs(60));

        for _ in 0..2 {
            throttle.record_failed_attempt("asha");
            assert!(throttle.check("asha"));
        }
        throttle.record_failed_attempt(" asha ");
        assert!(!throttle.check("asha"));
        assert!(throttle.check("ravi"));
    }

    #[test]
    fn test_case_variant_usernames_are_throttled_separately() {
        let throttle = LoginThrottle::new(2, Duration::from_secs(60));
        throttle.record_failed_attempt("Asha");
        throttle.record_failed_attempt("Asha");

        assert!(!throttle.check("Asha"));
        assert!(throttle.check("asha"));

        throttle.record_success("asha");
        assert!(!throttle.check("Asha"));
    }

    #[test]
    fn test_success_clears_failures() {
        let throttle = LoginThrottle::new(2, Duration::from_secs(60));
        throttle.record_failed_attempt("asha");
        throttle.record_success("asha");
        throttle.record_failed_attempt("asha");
        assert!(throttle.check("asha"));
    }

    #[test]
    fn test_lockout_expires() {
        let throttle = LoginThrottle::new(1, Duration::from_millis(10));
        throttle.record_failed_attempt("asha");
        assert!(!throttle.check("asha"));

        std::thread::sleep(Duration::from_millis(20));
        assert!(throttle.check("asha"));

        throttle.cleanup();
        assert!(throttle.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_task_sweeps_expired_lockouts() {
        let throttle = LoginThrottle::new(1, Duration::from_millis(10));
        throttle.record_failed_attempt("ghost");
        assert_eq!(throttle.attempts.len(), 1);

        let sweeper = throttle.spawn_cleanup(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(120)).await;
        sweeper.abort();

        assert!(throttle.attempts.is_empty());
    }
}
