//! Trailing-edge debouncing of input events.
//!
//! The debouncer owns no timer. Callers pass the current [`Instant`] on
//! every push and poll, which keeps it usable from any event loop and
//! deterministic under test.

use std::time::{Duration, Instant};

/// Holds the latest pushed value until `delay` has passed without another
/// push.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use pricesearch::Debouncer;
///
/// let start = Instant::now();
/// let mut d = Debouncer::new(Duration::from_millis(200));
/// d.push("b", start);
/// d.push("bo", start + Duration::from_millis(50));
/// assert_eq!(d.poll(start + Duration::from_millis(200)), None);
/// assert_eq!(d.poll(start + Duration::from_millis(250)), Some("bo"));
/// assert_eq!(d.poll(start + Duration::from_millis(900)), None);
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// A debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record `value` at `now`, replacing any value still pending.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if the quiet period has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if due {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Whether a value is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
