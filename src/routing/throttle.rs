use std::time::Duration;

/// Default spacing between routing requests for one tracked order.
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(30_000);

/// Admits at most one request per window.
///
/// The window is not keyed by destination: a destination change inside an
/// open window waits for the window like any other request.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window_ms: u64,
    last_request_at: Option<u64>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: window.as_millis() as u64,
            last_request_at: None,
        }
    }

    /// Claims the window at `now_ms` if it is open.
    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        match self.last_request_at {
            Some(last) if now_ms.saturating_sub(last) < self.window_ms => false,
            _ => {
                self.last_request_at = Some(now_ms);
                true
            }
        }
    }

    pub fn last_request_at(&self) -> Option<u64> {
        self.last_request_at
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_always_passes() {
        let mut limiter = RateLimiter::default();
        assert!(limiter.try_acquire(0));
        assert_eq!(limiter.last_request_at(), Some(0));
    }

    #[test]
    fn requests_inside_the_window_are_refused() {
        let mut limiter = RateLimiter::default();
        assert!(limiter.try_acquire(1_000));
        assert!(!limiter.try_acquire(1_001));
        assert!(!limiter.try_acquire(30_999));
        assert!(limiter.try_acquire(31_000));
    }

    #[test]
    fn refused_requests_do_not_extend_the_window() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10));
        assert!(limiter.try_acquire(0));
        assert!(!limiter.try_acquire(9_000));
        assert!(limiter.try_acquire(10_000));
    }
}
