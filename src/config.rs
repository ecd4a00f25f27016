//! Tracker configuration: JSON file values with `TRACKER_*` environment overrides.

use crate::geolocation::GeolocationOptions;
use crate::routing::{TravelMode, DEFAULT_THROTTLE_WINDOW};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const ENV_THROTTLE_WINDOW_MS: &str = "TRACKER_THROTTLE_WINDOW_MS";
pub const ENV_GEO_TIMEOUT_MS: &str = "TRACKER_GEO_TIMEOUT_MS";
pub const ENV_GEO_HIGH_ACCURACY: &str = "TRACKER_GEO_HIGH_ACCURACY";
pub const ENV_GEO_WATCH: &str = "TRACKER_GEO_WATCH";

const DEFAULT_FALLBACK_SPEED_KMH: f64 = 30.0;
const DEFAULT_BOUNDS_PADDING_DEG: f64 = 0.005;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid tracker configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub throttle_window_ms: u64,
    pub travel_mode: TravelMode,
    /// Average speed used by the offline straight-line estimator.
    pub fallback_speed_kmh: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            throttle_window_ms: DEFAULT_THROTTLE_WINDOW.as_millis() as u64,
            travel_mode: TravelMode::Driving,
            fallback_speed_kmh: DEFAULT_FALLBACK_SPEED_KMH,
        }
    }
}

impl RoutingConfig {
    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_window_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub geolocation: GeolocationOptions,
    pub routing: RoutingConfig,
    /// Degrees added on every side of the fitted map bounds.
    pub bounds_padding_deg: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            geolocation: GeolocationOptions::default(),
            routing: RoutingConfig::default(),
            bounds_padding_deg: DEFAULT_BOUNDS_PADDING_DEG,
        }
    }
}

impl TrackerConfig {
    /// Parses a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(|name| env::var(name).ok())
    }

    /// Applies `TRACKER_*` overrides read through `lookup`.
    ///
    /// An override that is present but cannot be parsed is an error.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_THROTTLE_WINDOW_MS) {
            self.routing.throttle_window_ms = parse_millis(ENV_THROTTLE_WINDOW_MS, value)?;
        }
        if let Some(value) = lookup(ENV_GEO_TIMEOUT_MS) {
            self.geolocation.timeout_ms = parse_millis(ENV_GEO_TIMEOUT_MS, value)?;
        }
        if let Some(value) = lookup(ENV_GEO_HIGH_ACCURACY) {
            self.geolocation.enable_high_accuracy = parse_flag(ENV_GEO_HIGH_ACCURACY, value)?;
        }
        if let Some(value) = lookup(ENV_GEO_WATCH) {
            self.geolocation.watch = parse_flag(ENV_GEO_WATCH, value)?;
        }
        info!(
            throttle_window_ms = self.routing.throttle_window_ms,
            geo_timeout_ms = self.geolocation.timeout_ms,
            watch = self.geolocation.watch,
            "Tracker configuration loaded"
        );
        Ok(self)
    }
}

fn parse_millis(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnv {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = TrackerConfig::default();
        assert_eq!(config.routing.throttle_window(), Duration::from_secs(30));
        assert_eq!(config.routing.travel_mode, TravelMode::Driving);
        assert_eq!(config.geolocation.timeout_ms, 15_000);
        assert_eq!(config.geolocation.maximum_age_ms, 10_000);
        assert!(config.geolocation.enable_high_accuracy);
        assert!(!config.geolocation.watch);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TrackerConfig::from_json(
            r#"{"routing": {"travel_mode": "bicycling"}, "geolocation": {"watch": true}}"#,
        )
        .unwrap();
        assert_eq!(config.routing.travel_mode, TravelMode::Bicycling);
        assert_eq!(config.routing.throttle_window_ms, 30_000);
        assert!(config.geolocation.watch);
        assert!(config.geolocation.auto_start);
    }

    #[test]
    fn env_overrides_apply() {
        let config = TrackerConfig::default()
            .with_env_overrides(env_of(&[
                (ENV_THROTTLE_WINDOW_MS, "5000"),
                (ENV_GEO_HIGH_ACCURACY, "false"),
                (ENV_GEO_WATCH, "1"),
            ]))
            .unwrap();
        assert_eq!(config.routing.throttle_window_ms, 5_000);
        assert!(!config.geolocation.enable_high_accuracy);
        assert!(config.geolocation.watch);
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let err = TrackerConfig::default()
            .with_env_overrides(env_of(&[(ENV_GEO_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_GEO_TIMEOUT_MS, .. }));

        let err = TrackerConfig::default()
            .with_env_overrides(env_of(&[(ENV_GEO_WATCH, "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("TRACKER_GEO_WATCH"));
    }
}
