//! # Delivery Tracker Demo
//!
//! Runs one order through its whole lifecycle against the in-memory order
//! board and the offline straight-line router, logging every view the
//! tracking surface would render.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! TRACKER_THROTTLE_WINDOW_MS=0 RUST_LOG=debug cargo run
//! ```

use delivery_tracker::config::TrackerConfig;
use delivery_tracker::geolocation::{self, GeolocationOptions};
use delivery_tracker::lifecycle::{setup_tracing, TrackerSystem};
use delivery_tracker::model::{Coordinates, LiveOrderRecord, OrderId, OrderPatch, OrderStatus};
use delivery_tracker::routing::StraightLineRouter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Instrument};

const VENDOR: Coordinates = Coordinates { lat: 51.5033, lng: -0.1196 };
const CUSTOMER: Coordinates = Coordinates { lat: 51.5194, lng: -0.1270 };

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = TrackerConfig::from_env().map_err(|e| e.to_string())?;
    info!("Starting delivery tracker demo");

    // No platform is installed here, so the driver side reports unsupported.
    let driver_geo = geolocation::spawn(GeolocationOptions::default());
    tokio::time::sleep(Duration::from_millis(10)).await;
    info!(status = ?driver_geo.state().status, "Driver position acquisition");
    driver_geo.unmount().await.map_err(|e| e.to_string())?;

    let router = Arc::new(StraightLineRouter::new(config.routing.fallback_speed_kmh));
    let mut system = TrackerSystem::new(config, router);
    let order_id = OrderId::from("order_1");

    let mut record = LiveOrderRecord::new(order_id.clone(), OrderStatus::Pending);
    record.vendor_coordinates = Some(VENDOR);
    record.delivery_coordinates = Some(CUSTOMER);
    system.board.put(record).await.map_err(|e| e.to_string())?;

    let tracking = system.track(order_id.clone()).await.map_err(|e| e.to_string())?;
    let mut views = tracking.subscribe();
    let printer = tokio::spawn(
        async move {
            while views.changed().await.is_ok() {
                let view = views.borrow_and_update().clone();
                info!(
                    status = ?view.status,
                    show_map = view.show_map,
                    show_driver_marker = view.show_driver_marker,
                    eta = ?view.eta,
                    distance = ?view.distance,
                    "{}",
                    view.label
                );
            }
        }
        .instrument(tracing::info_span!("view")),
    );

    let driver_path = [
        Coordinates::new(51.4980, -0.1100),
        Coordinates::new(51.5010, -0.1150),
        Coordinates::new(51.5033, -0.1196),
        Coordinates::new(51.5100, -0.1220),
        Coordinates::new(51.5194, -0.1270),
    ];
    let steps = [
        OrderPatch::status(OrderStatus::Confirmed),
        OrderPatch::status(OrderStatus::Preparing),
        OrderPatch::status(OrderStatus::Ready),
        OrderPatch::status(OrderStatus::Claimed)
            .with_driver("driver_7", "Sam")
            .with_location(driver_path[0]),
        OrderPatch::driver_location(driver_path[1]),
        OrderPatch::driver_location(driver_path[2]),
        OrderPatch::status(OrderStatus::OutForDelivery).with_location(driver_path[3]),
        OrderPatch::status(OrderStatus::Delivered).with_location(driver_path[4]),
    ];

    for patch in steps {
        system
            .board
            .patch(order_id.clone(), patch)
            .await
            .map_err(|e| e.to_string())?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let last = tracking.view();
    info!(label = %last.label, eta = ?last.eta, "Final view");

    system.shutdown().await?;
    printer.await.map_err(|e| e.to_string())?;

    info!("Demo completed successfully");
    Ok(())
}
