//! Offline estimator with the same reply shape as the routing service.

use crate::routing::{RouteRequest, RouteResponse, RouteService, RoutingError, TravelMode};
use async_trait::async_trait;

/// Estimates travel from the great-circle distance and an average speed.
///
/// Useful when no routing service is configured; the estimate ignores the
/// road network entirely.
#[derive(Debug, Clone)]
pub struct StraightLineRouter {
    driving_kmh: f64,
}

impl StraightLineRouter {
    pub fn new(driving_kmh: f64) -> Self {
        Self { driving_kmh }
    }

    fn speed_kmh(&self, mode: TravelMode) -> f64 {
        match mode {
            TravelMode::Driving => self.driving_kmh,
            TravelMode::Bicycling => 15.0,
            TravelMode::Walking => 5.0,
        }
    }
}

#[async_trait]
impl RouteService for StraightLineRouter {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RoutingError> {
        let speed = self.speed_kmh(request.mode);
        if speed <= 0.0 {
            return Err(RoutingError::Transport(format!("invalid speed {speed} km/h")));
        }
        let metres = request.origin.distance_m(request.destination);
        let seconds = metres / (speed * 1000.0 / 3600.0);
        Ok(RouteResponse::single_leg(
            format_duration(seconds),
            format_distance(metres),
        ))
    }
}

/// `"850 m"` below a kilometre, `"3.4 km"` above.
pub fn format_distance(metres: f64) -> String {
    if metres < 1000.0 {
        format!("{} m", metres.round() as u64)
    } else {
        format!("{:.1} km", metres / 1000.0)
    }
}

/// Whole minutes, never less than one; hours once past sixty minutes.
pub fn format_duration(seconds: f64) -> String {
    let minutes = ((seconds / 60.0).round() as u64).max(1);
    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };
    if minutes < 60 {
        plural(minutes, "min")
    } else {
        let hours = plural(minutes / 60, "hour");
        match minutes % 60 {
            0 => hours,
            rest => format!("{} {}", hours, plural(rest, "min")),
        }
    }
}
