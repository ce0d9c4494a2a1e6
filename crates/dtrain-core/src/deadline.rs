use std::time::{Duration, Instant};

/// Absolute point in time shared by every peer check of one readiness wait.
///
/// Computed once per wait, so N peers together never take longer than the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(start: Instant, window: Duration) -> Self {
        Self { at: start + window }
    }

    pub fn starting_now(window: Duration) -> Self {
        Self::after(Instant::now(), window)
    }

    #[inline]
    pub fn at(&self) -> Instant {
        self.at
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_is_start_plus_window() {
        let start = Instant::now();
        let d = Deadline::after(start, Duration::from_secs(20));
        assert_eq!(d.at(), start + Duration::from_secs(20));
        assert!(!d.is_expired());
        assert!(d.remaining() <= Duration::from_secs(20));
    }

    #[test]
    fn past_deadline_has_nothing_left() {
        let d = Deadline::after(Instant::now(), Duration::ZERO);
        assert!(d.is_expired());
        assert_eq!(d.remaining(), Duration::ZERO);
    }
}
