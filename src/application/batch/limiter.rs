//! Rolling-window request limiter.
//!
//! Counts upstream attempts in a rolling minute and a rolling day. A
//! window resets once more than its length has elapsed since it started;
//! windows are not aligned to calendar boundaries.

use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Error, RateWindow, Result};

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Limiter ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitConfig {
    /// Disabled limiters accept every request.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum attempts per rolling minute.
    #[serde(default = "default_per_minute")]
    pub per_minute: u32,
    /// Maximum attempts per rolling day.
    #[serde(default = "default_per_day")]
    pub per_day: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            per_minute: default_per_minute(),
            per_day: default_per_day(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

const fn default_per_minute() -> u32 {
    60
}

const fn default_per_day() -> u32 {
    10_000
}

/// Counters for both windows.
#[derive(Debug, Clone, Copy)]
struct RateLimitState {
    minute_count: u32,
    minute_start: Instant,
    day_count: u32,
    day_start: Instant,
}

impl RateLimitState {
    fn new(now: Instant) -> Self {
        Self {
            minute_count: 0,
            minute_start: now,
            day_count: 0,
            day_start: now,
        }
    }
}

/// Point-in-time view of the limiter's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub minute_count: u32,
    pub day_count: u32,
}

/// Per-minute and per-day request limiter.
///
/// # Thread Safety
///
/// The check-and-increment step runs under a mutex with no await inside,
/// so concurrent callers on a multi-threaded runtime can never both take
/// the last slot of a window.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<RateLimitState>,
}

impl RateLimiter {
    /// Create a limiter whose windows start now.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(RateLimitState::new(Instant::now())),
        }
    }

    /// Create a limiter that accepts everything, for trusted internal jobs.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        })
    }

    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Take one request slot from both windows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RateLimited`] when either ceiling is reached. The
    /// minute window reports how long until it resets; the day window
    /// reports no estimate. A rejected call consumes nothing.
    pub fn check(&self) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let now = Instant::now();
        let mut state = self.state.lock();

        if now.duration_since(state.minute_start) > MINUTE {
            state.minute_count = 0;
            state.minute_start = now;
        }
        if now.duration_since(state.day_start) > DAY {
            debug!(requests = state.day_count, "Day window reset");
            state.day_count = 0;
            state.day_start = now;
        }

        if state.minute_count >= self.config.per_minute {
            let retry_after = (state.minute_start + MINUTE).saturating_duration_since(now);
            warn!(
                limit = self.config.per_minute,
                retry_after_secs = retry_after.as_secs(),
                "Per-minute rate limit reached"
            );
            return Err(Error::RateLimited {
                window: RateWindow::Minute,
                retry_after: Some(retry_after),
            });
        }
        if state.day_count >= self.config.per_day {
            warn!(limit = self.config.per_day, "Per-day rate limit reached");
            return Err(Error::RateLimited {
                window: RateWindow::Day,
                retry_after: None,
            });
        }

        state.minute_count = state.minute_count.saturating_add(1);
        state.day_count = state.day_count.saturating_add(1);
        Ok(())
    }

    /// Current counters, without resetting expired windows.
    #[must_use]
    pub fn snapshot(&self) -> RateLimitSnapshot {
        let state = self.state.lock();
        RateLimitSnapshot {
            minute_count: state.minute_count,
            day_count: state.day_count,
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(per_minute: u32, per_day: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            enabled: true,
            per_minute,
            per_day,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_after_minute_ceiling() {
        let limiter = limiter(3, 100);
        for _ in 0..3 {
            limiter.check().unwrap();
        }

        let err = limiter.check().unwrap_err();
        assert!(matches!(
            err,
            Error::RateLimited {
                window: RateWindow::Minute,
                retry_after: Some(wait),
            } if wait <= MINUTE && wait > Duration::ZERO
        ));
        // Rejections do not consume a slot.
        assert_eq!(limiter.snapshot().minute_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn minute_window_resets_after_elapsing() {
        let limiter = limiter(2, 100);
        limiter.check().unwrap();
        limiter.check().unwrap();
        assert!(limiter.check().is_err());

        tokio::time::advance(MINUTE + Duration::from_millis(1)).await;

        limiter.check().unwrap();
        assert_eq!(limiter.snapshot().minute_count, 1);
        assert_eq!(limiter.snapshot().day_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_shrinks_as_window_ages() {
        let limiter = limiter(1, 100);
        limiter.check().unwrap();

        tokio::time::advance(Duration::from_secs(45)).await;

        match limiter.check() {
            Err(Error::RateLimited {
                retry_after: Some(wait),
                ..
            }) => assert_eq!(wait, Duration::from_secs(15)),
            other => panic!("expected minute rate limit, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_after_day_ceiling_without_estimate() {
        let limiter = limiter(100, 2);
        limiter.check().unwrap();
        limiter.check().unwrap();

        // Minute window rolls over but the day window does not.
        tokio::time::advance(MINUTE * 2).await;

        assert!(matches!(
            limiter.check(),
            Err(Error::RateLimited {
                window: RateWindow::Day,
                retry_after: None,
            })
        ));

        tokio::time::advance(DAY).await;
        limiter.check().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_limiter_accepts_everything() {
        let limiter = RateLimiter::disabled();
        for _ in 0..1_000 {
            limiter.check().unwrap();
        }
        assert_eq!(limiter.snapshot().minute_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checks_never_exceed_ceiling() {
        let limiter = std::sync::Arc::new(limiter(25, 1_000));
        let handles: Vec<_> = (0..100)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check().is_ok() })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 25);
    }
}
