//! Sliding-window rate limiting.
//!
//! One limiter instance per concern (auth endpoints keyed by client IP,
//! API endpoints keyed by user id). Timestamps older than the window are
//! dropped on each check, so memory stays proportional to active keys.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

pub struct RateLimiter {
    max_per_window: usize,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_per_window: usize) -> Self {
        Self {
            max_per_window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit for `key`. Returns false when the key is over its limit.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut hits = match self.hits.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entries = hits.entry(key.to_string()).or_default();
        entries.retain(|t| now.duration_since(*t) < WINDOW);
        if entries.len() >= self.max_per_window {
            return false;
        }
        entries.push(now);
        true
    }
}
