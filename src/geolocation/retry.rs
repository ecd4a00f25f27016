use crate::geolocation::PositionError;
use std::time::Duration;

/// Automatic retries allowed per failure episode before a manual retry is required.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Backoff bookkeeping for one failure episode.
///
/// An episode starts at the first transient failure after a success and ends
/// at the next success or an explicit reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryEpisode {
    attempts: u32,
    next_delay: Option<Duration>,
}

impl RetryEpisode {
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn next_delay(&self) -> Option<Duration> {
        self.next_delay
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_RETRY_ATTEMPTS
    }

    /// Books the next automatic retry for `error`.
    ///
    /// Returns the delay to wait, or `None` when the error is terminal or the
    /// episode has used all of its attempts.
    pub fn schedule(&mut self, error: &PositionError) -> Option<Duration> {
        let base = error.retry_base_delay()?;
        if self.is_exhausted() {
            self.next_delay = None;
            return None;
        }
        self.attempts += 1;
        let delay = base * self.attempts;
        self.next_delay = Some(delay);
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.next_delay = None;
    }
}
