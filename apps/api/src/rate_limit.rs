//! Fixed-window request counter keyed by user id.
//!
//! State lives in this process only and entries are never evicted. Running
//! several replicas multiplies the effective limit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::errors::AppError;

/// Max requests per key per window.
pub const LIMIT: u32 = 10_000;
/// Window length in milliseconds.
pub const WINDOW_MS: u64 = 6_000_000;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    started: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(LIMIT, Duration::from_millis(WINDOW_MS))
    }
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request for `key`, or fails with the seconds left in the window.
    pub fn check(&self, key: &str) -> Result<(), AppError> {
        self.check_at(key, Instant::now())
    }

    pub(crate) fn check_at(&self, key: &str, now: Instant) -> Result<(), AppError> {
        // Counts stay valid if a previous holder panicked.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let elapsed = match entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.started),
            None => {
                entries.insert(key.to_string(), WindowEntry { count: 1, started: now });
                return Ok(());
            }
        };

        if elapsed > self.window {
            entries.insert(key.to_string(), WindowEntry { count: 1, started: now });
            return Ok(());
        }

        let Some(entry) = entries.get_mut(key) else {
            return Ok(());
        };
        if entry.count >= self.limit {
            let remaining_ms = (self.window - elapsed).as_millis() as u64;
            let retry_after_secs = remaining_ms.div_ceil(1000);
            warn!("Rate limit hit for {key}: retry in {retry_after_secs}s");
            return Err(AppError::RateLimited { retry_after_secs });
        }
        entry.count += 1;
        Ok(())
    }

    #[cfg(test)]
    fn count(&self, key: &str) -> Option<u32> {
        self.entries.lock().unwrap().get(key).map(|e| e.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_starts_window_at_one() {
        let limiter = RateLimiter::default();
        limiter.check("user-a").unwrap();
        assert_eq!(limiter.count("user-a"), Some(1));
    }

    #[test]
    fn test_call_after_limit_fails_with_wait_time() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for _ in 0..LIMIT {
            limiter.check_at("user-a", start).unwrap();
        }
        assert_eq!(limiter.count("user-a"), Some(LIMIT));

        let err = limiter
            .check_at("user-a", start + Duration::from_millis(1_500))
            .unwrap_err();
        match err {
            AppError::RateLimited { retry_after_secs } => {
                // (6_000_000 - 1_500) ms rounds up to 5999 s
                assert_eq!(retry_after_secs, 5_999);
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }

        let message = limiter
            .check_at("user-a", start + Duration::from_millis(10))
            .unwrap_err()
            .to_string();
        assert!(message.starts_with("Rate limit exceeded. Try again in"));
    }

    #[test]
    fn test_wait_time_rounds_up_partial_seconds() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10_000));
        let start = Instant::now();
        limiter.check_at("k", start).unwrap();
        let err = limiter
            .check_at("k", start + Duration::from_millis(8_001))
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited { retry_after_secs: 2 }));
    }

    #[test]
    fn test_counter_resets_after_window() {
        let limiter = RateLimiter::new(2, Duration::from_millis(WINDOW_MS));
        let start = Instant::now();
        limiter.check_at("user-a", start).unwrap();
        limiter.check_at("user-a", start).unwrap();
        assert!(limiter.check_at("user-a", start).is_err());

        let later = start + Duration::from_millis(WINDOW_MS + 1);
        limiter.check_at("user-a", later).unwrap();
        assert_eq!(limiter.count("user-a"), Some(1));
    }

    #[test]
    fn test_window_boundary_is_still_inside() {
        let limiter = RateLimiter::new(1, Duration::from_millis(1_000));
        let start = Instant::now();
        limiter.check_at("k", start).unwrap();
        assert!(limiter
            .check_at("k", start + Duration::from_millis(1_000))
            .is_err());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        limiter.check_at("a", start).unwrap();
        assert!(limiter.check_at("a", start).is_err());
        limiter.check_at("b", start).unwrap();
    }
}
