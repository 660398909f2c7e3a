//! Sliding-window rate limiting keyed by client identity.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Admits at most `max` requests per `window` for each key.
///
/// Each key keeps the instants of its admitted requests. Every check drops
/// keys whose newest request has left the window, so idle clients are not
/// retained.
pub struct SlidingWindowLimiter {
    max: u32,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and record a request for `key` now.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, Instant::now())
    }

    /// Check and record a request for `key` at `now`.
    ///
    /// On rejection, returns how long until the oldest request leaves the
    /// window. Rejected requests are not recorded.
    pub fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        hits.retain(|_, entries| {
            entries
                .back()
                .is_some_and(|&newest| now.saturating_duration_since(newest) < self.window)
        });
        let entries = hits.entry(key.to_string()).or_default();

        while let Some(&oldest) = entries.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                entries.pop_front();
            } else {
                break;
            }
        }

        if entries.len() >= self.max as usize {
            let retry_after = entries
                .front()
                .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(self.window);
            return Err(retry_after);
        }

        entries.push_back(now);
        Ok(())
    }

    /// Number of keys with requests still inside the window.
    pub fn tracked_keys(&self) -> usize {
        self.hits.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Forget all recorded requests.
    pub fn reset(&self) {
        self.hits.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_max_then_rejects() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        let t0 = Instant::now();
        for i in 0..3 {
            assert!(limiter.check_at("a", t0 + Duration::from_secs(i)).is_ok());
        }
        let retry = limiter.check_at("a", t0 + Duration::from_secs(10)).unwrap_err();
        assert_eq!(retry, Duration::from_secs(50));
    }

    #[test]
    fn window_slides() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
        let t0 = Instant::now();
        limiter.check_at("a", t0).unwrap();
        limiter.check_at("a", t0 + Duration::from_secs(30)).unwrap();
        assert!(limiter.check_at("a", t0 + Duration::from_secs(59)).is_err());
        // first hit expires at t0 + 60
        assert!(limiter.check_at("a", t0 + Duration::from_secs(60)).is_ok());
        assert!(limiter.check_at("a", t0 + Duration::from_secs(61)).is_err());
    }

    #[test]
    fn keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(limiter.check_at("a", t0).is_ok());
        assert!(limiter.check_at("a", t0).is_err());
        assert!(limiter.check_at("b", t0).is_ok());
    }

    #[test]
    fn idle_keys_are_dropped_after_the_window() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        for i in 0..1000 {
            limiter.check_at(&format!("10.0.0.{i}"), t0).unwrap();
        }
        assert_eq!(limiter.tracked_keys(), 1000);

        limiter.check_at("fresh", t0 + Duration::from_secs(60)).unwrap();
        assert_eq!(limiter.tracked_keys(), 1);

        // a key still inside its window survives the sweep
        limiter.check_at("other", t0 + Duration::from_secs(90)).unwrap();
        assert_eq!(limiter.tracked_keys(), 2);
        assert!(limiter.check_at("fresh", t0 + Duration::from_secs(100)).is_err());
    }

    #[test]
    fn reset_clears_history() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        limiter.check_at("a", t0).unwrap();
        limiter.reset();
        assert!(limiter.check_at("a", t0).is_ok());
    }
}
