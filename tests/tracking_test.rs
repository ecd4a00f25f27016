use delivery_tracker::config::TrackerConfig;
use delivery_tracker::lifecycle::TrackerSystem;
use delivery_tracker::mock::MockRouter;
use delivery_tracker::model::{Coordinates, LiveOrderRecord, OrderId, OrderPatch, OrderStatus};
use delivery_tracker::order_board::{self, OrderBoardClient};
use delivery_tracker::routing::{ManualClock, RouteResponse, RoutingError, StraightLineRouter};
use delivery_tracker::tracking::{TrackingHandle, TrackingSession, TrackingView};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const VENDOR: Coordinates = Coordinates { lat: 51.5033, lng: -0.1196 };
const CUSTOMER: Coordinates = Coordinates { lat: 51.5194, lng: -0.1270 };

async fn board_with_order(order_id: &str) -> OrderBoardClient {
    let board = order_board::spawn();
    let mut record = LiveOrderRecord::new(order_id, OrderStatus::Pending);
    record.vendor_coordinates = Some(VENDOR);
    record.delivery_coordinates = Some(CUSTOMER);
    board.put(record).await.expect("Failed to put order");
    board
}

async fn track(
    board: &OrderBoardClient,
    order_id: &str,
    router: &MockRouter,
    clock: Arc<ManualClock>,
) -> TrackingHandle {
    let (session, handle) = TrackingSession::new(
        board,
        OrderId::from(order_id),
        Arc::new(router.clone()),
        clock,
        &TrackerConfig::default(),
    )
    .await
    .expect("Failed to start tracking");
    tokio::spawn(session.run());
    handle
}

async fn next_view(
    views: &mut watch::Receiver<TrackingView>,
    ready: impl FnMut(&TrackingView) -> bool,
) -> TrackingView {
    views.wait_for(ready).await.expect("Tracking session ended").clone()
}

async fn set_status(board: &OrderBoardClient, patch: OrderPatch) {
    board
        .patch("order_1".into(), patch)
        .await
        .expect("Failed to patch order");
}

/// Full lifecycle of one order, from placement to delivery.
#[tokio::test]
async fn view_follows_the_order_through_its_lifecycle() {
    let board = board_with_order("order_1").await;
    let router = MockRouter::new().with_fallback(RouteResponse::single_leg("7 mins", "2.0 km"));
    let clock = Arc::new(ManualClock::new(0));
    let handle = track(&board, "order_1", &router, clock.clone()).await;
    let mut views = handle.subscribe();

    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Pending)).await;
    assert!(!view.show_map);
    assert!(!view.show_driver_marker);
    assert_eq!(view.label, "Waiting for vendor to accept your order…");
    assert!(view.bounds.is_some_and(|b| b.contains(VENDOR) && b.contains(CUSTOMER)));

    set_status(&board, OrderPatch::status(OrderStatus::Confirmed)).await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Confirmed)).await;
    assert!(view.show_map);
    assert!(!view.show_driver_marker);
    assert_eq!(view.label, "Vendor confirmed your order!");

    set_status(&board, OrderPatch::status(OrderStatus::Preparing)).await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Preparing)).await;
    assert!(view.show_map);

    set_status(&board, OrderPatch::status(OrderStatus::Ready)).await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Ready)).await;
    assert_eq!(view.label, "Order ready — assigning a driver…");
    assert_eq!(router.route_calls(), 0);

    let start = Coordinates::new(51.4980, -0.1100);
    set_status(
        &board,
        OrderPatch::status(OrderStatus::Claimed)
            .with_driver("driver_7", "Sam")
            .with_location(start),
    )
    .await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Claimed)).await;
    assert!(view.show_map);
    assert!(view.show_driver_marker);
    assert_eq!(view.driver_coordinates, Some(start));
    assert_eq!(view.label, "Sam is heading to pickup");
    assert_eq!(view.destination, Some(VENDOR));
    assert_eq!(view.eta.as_deref(), Some("7 mins"));
    assert_eq!(router.route_calls(), 1);
    assert_eq!(router.requests()[0].destination, VENDOR);

    // Inside the throttle window the marker and bounds move, the route does not.
    clock.advance(Duration::from_secs(10));
    let moved = Coordinates::new(51.4700, -0.0900);
    set_status(&board, OrderPatch::driver_location(moved)).await;
    let view = next_view(&mut views, |v| v.driver_coordinates == Some(moved)).await;
    assert!(view.bounds.is_some_and(|b| b.contains(moved)));
    assert_eq!(router.route_calls(), 1);

    clock.advance(Duration::from_secs(30));
    set_status(&board, OrderPatch::status(OrderStatus::OutForDelivery)).await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::OutForDelivery)).await;
    assert_eq!(view.label, "Sam is on the way");
    assert_eq!(view.destination, Some(CUSTOMER));
    assert_eq!(router.route_calls(), 2);
    assert_eq!(router.requests()[1].destination, CUSTOMER);
    assert_eq!(router.requests()[1].origin, moved);

    clock.advance(Duration::from_secs(60));
    set_status(
        &board,
        OrderPatch::status(OrderStatus::Delivered).with_location(CUSTOMER),
    )
    .await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Delivered)).await;
    assert!(!view.show_map);
    assert!(view.show_driver_marker);
    assert_eq!(view.label, "Your order has been delivered!");
    assert_eq!(router.route_calls(), 2);

    handle.shutdown().await.unwrap();
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn destination_switch_inside_the_window_keeps_the_old_estimate() {
    let board = board_with_order("order_1").await;
    let router = MockRouter::new();
    router.expect_route().return_ok(RouteResponse::single_leg("4 mins", "1.2 km"));
    let clock = Arc::new(ManualClock::new(0));
    let handle = track(&board, "order_1", &router, clock.clone()).await;
    let mut views = handle.subscribe();

    let driver = Coordinates::new(51.5000, -0.1150);
    set_status(
        &board,
        OrderPatch::status(OrderStatus::Claimed)
            .with_driver("driver_7", "")
            .with_location(driver),
    )
    .await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Claimed)).await;
    assert_eq!(view.label, "Your driver is heading to pickup");

    clock.advance(Duration::from_secs(5));
    set_status(&board, OrderPatch::status(OrderStatus::OutForDelivery)).await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::OutForDelivery)).await;

    assert_eq!(view.destination, Some(CUSTOMER));
    assert_eq!(view.eta.as_deref(), Some("4 mins"));
    assert_eq!(router.route_calls(), 1);
    router.verify();
}

#[tokio::test]
async fn routing_failures_never_reach_the_view() {
    let board = board_with_order("order_1").await;
    let router = MockRouter::new();
    router.expect_route().return_err(RoutingError::Transport("offline".into()));
    let clock = Arc::new(ManualClock::new(0));
    let handle = track(&board, "order_1", &router, clock).await;
    let mut views = handle.subscribe();

    set_status(
        &board,
        OrderPatch::status(OrderStatus::Claimed)
            .with_driver("driver_7", "Sam")
            .with_location(Coordinates::new(51.5, -0.11)),
    )
    .await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Claimed)).await;

    assert!(view.show_driver_marker);
    assert_eq!(view.eta, None);
    assert_eq!(view.distance, None);
    assert!(view.bounds.is_some());
    router.verify();
}

#[tokio::test]
async fn cancelled_order_hides_everything() {
    let board = board_with_order("order_1").await;
    let router = MockRouter::new();
    let handle = track(&board, "order_1", &router, Arc::new(ManualClock::new(0))).await;
    let mut views = handle.subscribe();

    set_status(&board, OrderPatch::status(OrderStatus::Cancelled)).await;
    let view = next_view(&mut views, |v| v.status == Some(OrderStatus::Cancelled)).await;

    assert!(!view.show_map);
    assert!(!view.show_driver_marker);
    assert_eq!(view.label, "This order was cancelled.");
    assert_eq!(router.route_calls(), 0);
}

#[tokio::test]
async fn no_updates_after_shutdown() {
    let board = board_with_order("order_1").await;
    let router = MockRouter::new();
    let handle = track(&board, "order_1", &router, Arc::new(ManualClock::new(0))).await;
    let mut views = handle.subscribe();
    next_view(&mut views, |v| v.status == Some(OrderStatus::Pending)).await;

    handle.shutdown().await.unwrap();
    set_status(&board, OrderPatch::status(OrderStatus::Confirmed)).await;
    tokio::task::yield_now().await;

    assert_eq!(handle.view().status, Some(OrderStatus::Pending));
    // The session is gone, so the view channel is closed.
    assert!(views.changed().await.is_err());
}

#[tokio::test]
async fn tracking_an_order_that_does_not_exist_yet() {
    let board = order_board::spawn();
    let router = MockRouter::new();
    let handle = track(&board, "order_9", &router, Arc::new(ManualClock::new(0))).await;
    let mut views = handle.subscribe();

    let view = handle.view();
    assert_eq!(view.status, None);
    assert_eq!(view.label, "Tracking your order…");

    board
        .put(LiveOrderRecord::new("order_9", OrderStatus::Preparing))
        .await
        .unwrap();
    let view = next_view(&mut views, |v| v.status.is_some()).await;
    assert_eq!(view.status, Some(OrderStatus::Preparing));
    assert!(view.show_map);
    assert_eq!(view.bounds, None);
}

/// End-to-end through the system wiring with the offline router.
#[tokio::test]
async fn tracker_system_tracks_and_shuts_down() {
    let config = TrackerConfig::default();
    let router = Arc::new(StraightLineRouter::new(config.routing.fallback_speed_kmh));
    let mut system = TrackerSystem::new(config, router);

    let mut record = LiveOrderRecord::new("order_1", OrderStatus::Confirmed);
    record.vendor_coordinates = Some(VENDOR);
    record.delivery_coordinates = Some(CUSTOMER);
    system.board.put(record).await.unwrap();

    let handle = system.track("order_1".into()).await.unwrap();
    let mut views = handle.subscribe();
    next_view(&mut views, |v| v.status == Some(OrderStatus::Confirmed)).await;

    system
        .board
        .patch(
            "order_1".into(),
            OrderPatch::status(OrderStatus::OutForDelivery)
                .with_driver("driver_7", "Sam")
                .with_location(VENDOR),
        )
        .await
        .unwrap();
    let view = next_view(&mut views, |v| v.eta.is_some()).await;

    assert_eq!(view.destination, Some(CUSTOMER));
    assert!(view.distance.is_some_and(|d| d.ends_with("km")));

    system.shutdown().await.expect("Failed to shut down");
}
