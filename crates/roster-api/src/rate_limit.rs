use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use roster_security::SessionRole;

use crate::error::ApiError;

/// Checks between sweeps of keys whose quota has fully replenished.
const PRUNE_EVERY: u64 = 1024;

/// Throttles login attempts per (role, tenant, username).
pub struct LoginLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    checks: AtomicU64,
    prune_every: u64,
}

impl LoginLimiter {
    pub fn new(attempts_per_minute: u32) -> Self {
        let burst = NonZeroU32::new(attempts_per_minute).unwrap_or(NonZeroU32::MIN);
        Self::with_quota(Quota::per_minute(burst), PRUNE_EVERY)
    }

    fn with_quota(quota: Quota, prune_every: u64) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            checks: AtomicU64::new(0),
            prune_every: prune_every.max(1),
        }
    }

    pub fn check(&self, role: SessionRole, tenant: Option<&str>, username: &str) -> Result<(), ApiError> {
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % self.prune_every == 0 {
            self.prune();
        }
        let key = format!(
            "{}:{}:{}",
            role,
            tenant.unwrap_or("-"),
            username.trim().to_ascii_lowercase()
        );
        self.limiter.check_key(&key).map_err(|_| {
            warn!("Login rate limit hit for {}", key);
            ApiError::TooManyRequests
        })
    }

    /// Drops keys that would behave like fresh ones.
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!("Login limiter pruned {} -> {} keys", before, self.limiter.len());
    }

    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_limits_per_key() {
        let limiter = LoginLimiter::new(2);
        assert!(limiter.check(SessionRole::Admin, Some("acme"), "root").is_ok());
        assert!(limiter.check(SessionRole::Admin, Some("acme"), "ROOT").is_ok());
        assert!(matches!(
            limiter.check(SessionRole::Admin, Some("acme"), "root"),
            Err(ApiError::TooManyRequests)
        ));

        assert!(limiter.check(SessionRole::Admin, Some("other"), "root").is_ok());
        assert!(limiter.check(SessionRole::Employee, Some("acme"), "root").is_ok());
    }

    #[test]
    fn test_keys_are_released_after_the_quota_window() {
        let quota = Quota::with_period(Duration::from_millis(10)).unwrap();
        let limiter = LoginLimiter::with_quota(quota, 4);
        for user in ["a", "b", "c"] {
            assert!(limiter.check(SessionRole::Employee, Some("acme"), user).is_ok());
        }
        assert_eq!(limiter.len(), 3);

        std::thread::sleep(Duration::from_millis(50));
        // Fourth check triggers the sweep before recording its own key.
        assert!(limiter.check(SessionRole::Employee, Some("acme"), "d").is_ok());
        assert_eq!(limiter.len(), 1);

        std::thread::sleep(Duration::from_millis(50));
        limiter.prune();
        assert!(limiter.is_empty());
    }
}
