// src/throttle.rs
//! Process-wide request pacing. One instance is shared (via `Arc`) by every
//! collaborator that talks to the network.

use anyhow::{bail, Result};
use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    max_delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Delay bounds in seconds; each gap is drawn uniformly from `[min, max]`.
    pub fn new(min_secs: f64, max_secs: f64) -> Result<Self> {
        if !(min_secs.is_finite() && max_secs.is_finite()) || min_secs < 0.0 {
            bail!("rate limit bounds must be finite and non-negative");
        }
        if min_secs > max_secs {
            bail!("rate limit min ({min_secs}) exceeds max ({max_secs})");
        }
        Ok(Self {
            min_delay: Duration::from_secs_f64(min_secs),
            max_delay: Duration::from_secs_f64(max_secs),
            last: Mutex::new(None),
        })
    }

    /// No pacing at all; for tests and offline fixture runs.
    pub fn disabled() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            last: Mutex::new(None),
        }
    }

    /// Wait until the randomized gap since the previous request has elapsed.
    /// Callers are serialized: the lock is held across the sleep.
    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let gap = self.draw_gap();
            let elapsed = prev.elapsed();
            if elapsed < gap {
                tokio::time::sleep(gap - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn draw_gap(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let secs = rand::rng()
            .random_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_bounds() {
        assert!(RateLimiter::new(2.0, 1.0).is_err());
        assert!(RateLimiter::new(-1.0, 1.0).is_err());
        assert!(RateLimiter::new(f64::NAN, 1.0).is_err());
        assert!(RateLimiter::new(0.5, 0.5).is_ok());
    }

    #[tokio::test]
    async fn spaces_consecutive_calls() {
        let rl = RateLimiter::new(0.05, 0.08).unwrap();
        let t0 = std::time::Instant::now();
        rl.acquire().await; // first call never waits
        rl.acquire().await;
        rl.acquire().await;
        assert!(t0.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn disabled_never_waits() {
        let rl = RateLimiter::disabled();
        let t0 = std::time::Instant::now();
        for _ in 0..10 {
            rl.acquire().await;
        }
        assert!(t0.elapsed() < Duration::from_millis(50));
    }
}
