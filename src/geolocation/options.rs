use serde::Deserialize;
use std::time::Duration;

/// Maximum age accepted for the single low-accuracy fallback request.
pub const FALLBACK_MAXIMUM_AGE: Duration = Duration::from_secs(60);

/// Extra time granted to the low-accuracy fallback request.
pub const FALLBACK_EXTRA_TIMEOUT: Duration = Duration::from_secs(5);

/// Caller-facing configuration for one acquisition instance.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeolocationOptions {
    /// Continuous watch instead of a single fix.
    pub watch: bool,
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
    /// Start acquiring as soon as the actor runs.
    pub auto_start: bool,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            watch: false,
            enable_high_accuracy: true,
            timeout_ms: 15_000,
            maximum_age_ms: 10_000,
            auto_start: true,
        }
    }
}

impl GeolocationOptions {
    pub fn watching() -> Self {
        Self {
            watch: true,
            ..Self::default()
        }
    }

    /// Request options for one attempt at the given accuracy.
    pub fn request(&self, high_accuracy: bool) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }
}

/// Options passed to a backend for a single request or watch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl PositionOptions {
    /// The relaxed request used once after a high-accuracy one-shot fails.
    pub fn relaxed(self) -> Self {
        Self {
            enable_high_accuracy: false,
            timeout: self.timeout + FALLBACK_EXTRA_TIMEOUT,
            maximum_age: FALLBACK_MAXIMUM_AGE,
        }
    }
}
