use crate::model::{Coordinates, LiveOrderRecord, OrderId, OrderStatus};
use crate::routing::{MapBounds, RouteEstimate};
use crate::visibility::MapVisibility;
use serde::Serialize;

/// Everything the tracking screen renders for one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub order_id: OrderId,
    /// `None` until the first snapshot arrives.
    pub status: Option<OrderStatus>,
    pub show_map: bool,
    pub show_driver_marker: bool,
    pub label: String,
    pub vendor_coordinates: Option<Coordinates>,
    pub delivery_coordinates: Option<Coordinates>,
    /// Only set while the driver marker is shown.
    pub driver_coordinates: Option<Coordinates>,
    pub destination: Option<Coordinates>,
    pub eta: Option<String>,
    pub distance: Option<String>,
    pub bounds: Option<MapBounds>,
}

impl TrackingView {
    /// The view before any snapshot has arrived.
    pub fn pending(order_id: OrderId) -> Self {
        Self::compose(order_id, None, &RouteEstimate::default())
    }

    pub fn compose(
        order_id: OrderId,
        record: Option<&LiveOrderRecord>,
        estimate: &RouteEstimate,
    ) -> Self {
        let visibility = MapVisibility::for_record(record);
        let driver_coordinates = record
            .and_then(|r| r.driver_location)
            .filter(|_| visibility.show_driver_marker);
        Self {
            order_id,
            status: record.map(|r| r.status),
            show_map: visibility.show_map,
            show_driver_marker: visibility.show_driver_marker,
            label: visibility.label,
            vendor_coordinates: record.and_then(|r| r.vendor_coordinates),
            delivery_coordinates: record.and_then(|r| r.delivery_coordinates),
            driver_coordinates,
            destination: estimate.destination,
            eta: estimate.eta.clone(),
            distance: estimate.distance.clone(),
            bounds: estimate.bounds,
        }
    }
}
