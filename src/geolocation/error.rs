//! Normalised failure taxonomy for both position backends.

use crate::model::GeoStatus;
use std::time::Duration;
use thiserror::Error;

/// A position failure after normalisation.
///
/// Both the mobile bridge and the browser API report failures in their own
/// shape; their adapters map them onto these four cases.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PositionError {
    /// The user or the OS refused location access. Terminal.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The device could not determine a position right now. Transient.
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    /// No fix within the requested timeout. Transient.
    #[error("Position request timed out")]
    Timeout,

    /// No position capability in this environment at all. Terminal.
    #[error("Geolocation is not supported in this environment")]
    Unsupported,
}

impl PositionError {
    /// Status the caller should see after this failure.
    pub fn status(&self) -> GeoStatus {
        match self {
            PositionError::PermissionDenied => GeoStatus::Denied,
            PositionError::PositionUnavailable(_) | PositionError::Timeout => GeoStatus::Unavailable,
            PositionError::Unsupported => GeoStatus::Unsupported,
        }
    }

    /// Base backoff step for transient failures; `None` for terminal ones.
    ///
    /// Attempt `n` of an episode waits `n * base`.
    pub fn retry_base_delay(&self) -> Option<Duration> {
        match self {
            PositionError::PositionUnavailable(_) => Some(Duration::from_secs(3)),
            PositionError::Timeout => Some(Duration::from_secs(2)),
            PositionError::PermissionDenied | PositionError::Unsupported => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.retry_base_delay().is_some()
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            PositionError::PermissionDenied => {
                "Location permission denied. Please enable location access in your system settings."
            }
            PositionError::PositionUnavailable(_) | PositionError::Timeout => {
                "Location is temporarily unavailable. Retrying…"
            }
            PositionError::Unsupported => "Location is not supported on this device.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failures_carry_their_backoff_step() {
        assert_eq!(
            PositionError::PositionUnavailable("gps off".into()).retry_base_delay(),
            Some(Duration::from_secs(3))
        );
        assert_eq!(PositionError::Timeout.retry_base_delay(), Some(Duration::from_secs(2)));
        assert!(PositionError::PermissionDenied.retry_base_delay().is_none());
        assert!(PositionError::Unsupported.retry_base_delay().is_none());
    }

    #[test]
    fn timeout_surfaces_as_unavailable() {
        assert_eq!(PositionError::Timeout.status(), GeoStatus::Unavailable);
        assert_eq!(PositionError::PermissionDenied.status(), GeoStatus::Denied);
        assert!(PositionError::PermissionDenied.user_message().contains("settings"));
    }
}
