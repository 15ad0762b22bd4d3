//! Debounce for view recomputation after camera motion.
//!
//! Camera interaction arrives as a burst of small updates. Each update
//! re-arms a single deadline; projected coordinates are recomputed only
//! once the camera has been quiet for the full interval.

use std::time::{Duration, Instant};

/// One-shot timer that keeps pushing its deadline while re-armed.
#[derive(Debug)]
pub struct ApplyDebounce {
    interval: Duration,
    deadline: Option<Instant>,
}

impl ApplyDebounce {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the timer to fire `interval` after `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Returns true exactly once per armed deadline, the first time
    /// `now` reaches it. Firing disarms the timer.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}
