use crate::model::{Coordinates, OrderStatus};
use crate::routing::{
    Clock, MapBounds, RateLimiter, RouteRequest, RouteService, TravelMode,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Inputs for one engine update, taken from the latest order snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteInput {
    pub driver: Option<Coordinates>,
    pub status: OrderStatus,
    pub vendor: Option<Coordinates>,
    pub delivery: Option<Coordinates>,
}

/// What the engine currently knows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteEstimate {
    /// Formatted travel time of the last successful route.
    pub eta: Option<String>,
    /// Formatted distance of the last successful route.
    pub distance: Option<String>,
    pub destination: Option<Coordinates>,
    pub bounds: Option<MapBounds>,
}

/// Where the driver is heading: the customer once out for delivery, the
/// vendor before that.
pub fn destination_for(
    status: OrderStatus,
    vendor: Option<Coordinates>,
    delivery: Option<Coordinates>,
) -> Option<Coordinates> {
    if status == OrderStatus::OutForDelivery {
        delivery
    } else {
        vendor
    }
}

/// Throttled consumer of the routing service for one tracked order.
///
/// Bounds follow every driver move; the routing call itself goes through a
/// [`RateLimiter`]. A failed or non-`OK` call leaves the previous ETA and
/// distance in place and the next window tries again.
pub struct RouteEtaEngine {
    service: Arc<dyn RouteService>,
    clock: Arc<dyn Clock>,
    limiter: RateLimiter,
    mode: TravelMode,
    padding_deg: f64,
    estimate: RouteEstimate,
}

impl RouteEtaEngine {
    pub fn new(service: Arc<dyn RouteService>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            service,
            clock,
            limiter: RateLimiter::new(window),
            mode: TravelMode::Driving,
            padding_deg: 0.0,
            estimate: RouteEstimate::default(),
        }
    }

    pub fn with_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_padding(mut self, padding_deg: f64) -> Self {
        self.padding_deg = padding_deg;
        self
    }

    pub fn estimate(&self) -> &RouteEstimate {
        &self.estimate
    }

    /// Refits the bounds without touching the routing service.
    pub fn refit(&mut self, input: &RouteInput) -> Option<MapBounds> {
        let points = [input.vendor, input.delivery, input.driver];
        self.estimate.bounds = MapBounds::fit(points.into_iter().flatten(), self.padding_deg);
        self.estimate.destination = destination_for(input.status, input.vendor, input.delivery);
        self.estimate.bounds
    }

    /// Refits bounds and, if the throttle window allows, refreshes the route.
    pub async fn update(&mut self, input: RouteInput) -> RouteEstimate {
        self.refit(&input);

        let (Some(origin), Some(destination)) = (input.driver, self.estimate.destination) else {
            return self.estimate.clone();
        };

        if !self.limiter.try_acquire(self.clock.now_ms()) {
            debug!(status = %input.status, "Route request throttled");
            return self.estimate.clone();
        }

        let request = RouteRequest {
            origin,
            destination,
            mode: self.mode,
        };
        match self.service.route(&request).await {
            Ok(response) => match response.first_leg() {
                Ok(leg) => {
                    info!(
                        eta = %leg.duration.text,
                        distance = %leg.distance.text,
                        %destination,
                        "Route refreshed"
                    );
                    self.estimate.eta = Some(leg.duration.text.clone());
                    self.estimate.distance = Some(leg.distance.text.clone());
                }
                Err(e) => warn!(error = %e, "Route unusable; keeping previous estimate"),
            },
            Err(e) => warn!(error = %e, "Route request failed; keeping previous estimate"),
        }
        self.estimate.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRouter;
    use crate::routing::{ManualClock, RouteResponse, RoutingError};

    const VENDOR: Coordinates = Coordinates { lat: 51.50, lng: -0.10 };
    const CUSTOMER: Coordinates = Coordinates { lat: 51.52, lng: -0.14 };

    fn input(status: OrderStatus, driver: Coordinates) -> RouteInput {
        RouteInput {
            driver: Some(driver),
            status,
            vendor: Some(VENDOR),
            delivery: Some(CUSTOMER),
        }
    }

    fn engine(router: &MockRouter, clock: Arc<ManualClock>) -> RouteEtaEngine {
        RouteEtaEngine::new(Arc::new(router.clone()), clock, Duration::from_secs(30))
    }

    #[test]
    fn destination_switches_only_when_out_for_delivery() {
        for status in [OrderStatus::Claimed, OrderStatus::Ready, OrderStatus::Delivered] {
            assert_eq!(destination_for(status, Some(VENDOR), Some(CUSTOMER)), Some(VENDOR));
        }
        assert_eq!(
            destination_for(OrderStatus::OutForDelivery, Some(VENDOR), Some(CUSTOMER)),
            Some(CUSTOMER)
        );
    }

    #[tokio::test]
    async fn second_request_inside_window_reuses_estimate() {
        let router = MockRouter::new();
        router.expect_route().return_ok(RouteResponse::single_leg("12 mins", "4.1 km"));
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&router, clock.clone());

        let first = engine.update(input(OrderStatus::Claimed, Coordinates::new(51.51, -0.11))).await;
        clock.advance(Duration::from_millis(29_999));
        let second = engine.update(input(OrderStatus::Claimed, Coordinates::new(51.505, -0.105))).await;

        assert_eq!(router.route_calls(), 1);
        assert_eq!(second.eta, first.eta);
        assert_eq!(second.distance.as_deref(), Some("4.1 km"));
        router.verify();
    }

    #[tokio::test]
    async fn failures_keep_the_previous_estimate() {
        let router = MockRouter::new();
        router.expect_route().return_ok(RouteResponse::single_leg("12 mins", "4.1 km"));
        router.expect_route().return_ok(RouteResponse::with_status("ZERO_RESULTS"));
        router.expect_route().return_err(RoutingError::Transport("offline".into()));
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&router, clock.clone());

        engine.update(input(OrderStatus::Claimed, Coordinates::new(51.51, -0.11))).await;
        for _ in 0..2 {
            clock.advance(Duration::from_secs(30));
            let estimate = engine.update(input(OrderStatus::Claimed, Coordinates::new(51.51, -0.11))).await;
            assert_eq!(estimate.eta.as_deref(), Some("12 mins"));
            assert_eq!(estimate.distance.as_deref(), Some("4.1 km"));
        }
        assert_eq!(router.route_calls(), 3);
        router.verify();
    }

    #[tokio::test]
    async fn bounds_follow_the_driver_even_when_throttled() {
        let router = MockRouter::new();
        router.expect_route().return_ok(RouteResponse::single_leg("5 mins", "1.0 km"));
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&router, clock);

        engine.update(input(OrderStatus::Claimed, Coordinates::new(51.51, -0.11))).await;
        let far = Coordinates::new(51.60, -0.30);
        let estimate = engine.update(input(OrderStatus::Claimed, far)).await;

        assert_eq!(router.route_calls(), 1);
        assert!(estimate.bounds.unwrap().contains(far));
    }

    #[tokio::test]
    async fn throttle_is_shared_across_destinations() {
        let router = MockRouter::new();
        router.expect_route().return_ok(RouteResponse::single_leg("5 mins", "1.0 km"));
        router.expect_route().return_ok(RouteResponse::single_leg("9 mins", "3.0 km"));
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&router, clock.clone());
        let driver = Coordinates::new(51.51, -0.11);

        engine.update(input(OrderStatus::Claimed, driver)).await;
        clock.advance(Duration::from_secs(10));
        let flipped = engine.update(input(OrderStatus::OutForDelivery, driver)).await;

        // Destination already points at the customer, the route is still the vendor leg.
        assert_eq!(flipped.destination, Some(CUSTOMER));
        assert_eq!(flipped.eta.as_deref(), Some("5 mins"));
        assert_eq!(router.route_calls(), 1);

        clock.advance(Duration::from_secs(20));
        let refreshed = engine.update(input(OrderStatus::OutForDelivery, driver)).await;
        assert_eq!(refreshed.eta.as_deref(), Some("9 mins"));
        assert_eq!(router.requests()[1].destination, CUSTOMER);
    }

    #[tokio::test]
    async fn no_driver_means_no_request() {
        let router = MockRouter::new();
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&router, clock);

        let estimate = engine
            .update(RouteInput {
                driver: None,
                status: OrderStatus::Preparing,
                vendor: Some(VENDOR),
                delivery: Some(CUSTOMER),
            })
            .await;

        assert_eq!(router.route_calls(), 0);
        assert!(estimate.bounds.is_some());
        assert!(estimate.eta.is_none());
    }
}
