//! One-shot timer with reset semantics, polled by the scheduler tick.

use std::time::{Duration, Instant};

/// Debounced value holder: scheduling replaces the pending value and resets
/// the timer; polling after the delay elapses fires at most once.
///
/// Preview generation is the main customer: the cursor moves frequently and
/// the previewer is expensive, so only the value that survives the delay is
/// handed on.
#[derive(Debug)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debounce<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the timer from `now`.
    pub fn schedule(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => {
                self.pending.take().map(|(_, value)| value)
            }
            _ => None,
        }
    }

    /// Drop any pending value without firing.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
