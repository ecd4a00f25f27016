//! Order status to map visibility, with no rendering dependency.

use crate::model::{LiveOrderRecord, OrderStatus};
use serde::Serialize;

/// Name shown when the record has no driver name yet.
pub const DEFAULT_DRIVER_NAME: &str = "Your driver";

/// What the tracking surface should draw for one order snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapVisibility {
    pub show_map: bool,
    pub show_driver_marker: bool,
    pub label: String,
}

/// The map is drawn from confirmation until the driver is on the way.
pub fn shows_map(status: OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::Confirmed
            | OrderStatus::Preparing
            | OrderStatus::Ready
            | OrderStatus::ReadyForPickup
            | OrderStatus::Claimed
            | OrderStatus::OutForDelivery
    )
}

/// Statuses in which a known driver position may be drawn.
///
/// `Delivered` is included, so the last known position stays on screen.
pub fn driver_marker_eligible(status: OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::Claimed | OrderStatus::OutForDelivery | OrderStatus::Delivered
    )
}

/// Status label, with the driver's name where the status mentions one.
pub fn status_label(status: Option<OrderStatus>, driver_name: Option<&str>) -> String {
    let driver = driver_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_DRIVER_NAME);
    match status {
        Some(OrderStatus::Pending) => "Waiting for vendor to accept your order…".to_string(),
        Some(OrderStatus::Confirmed) => "Vendor confirmed your order!".to_string(),
        Some(OrderStatus::Preparing) => "Your order is being prepared…".to_string(),
        Some(OrderStatus::Ready | OrderStatus::ReadyForPickup) => {
            "Order ready — assigning a driver…".to_string()
        }
        Some(OrderStatus::Claimed) => format!("{} is heading to pickup", driver),
        Some(OrderStatus::OutForDelivery) => format!("{} is on the way", driver),
        Some(OrderStatus::Delivered) => "Your order has been delivered!".to_string(),
        Some(OrderStatus::Cancelled) => "This order was cancelled.".to_string(),
        Some(OrderStatus::Unknown) | None => "Tracking your order…".to_string(),
    }
}

impl MapVisibility {
    /// Visibility for a status; `None` means no snapshot has arrived yet.
    pub fn for_status(
        status: Option<OrderStatus>,
        driver_name: Option<&str>,
        has_driver_location: bool,
    ) -> Self {
        Self {
            show_map: status.is_some_and(shows_map),
            show_driver_marker: has_driver_location && status.is_some_and(driver_marker_eligible),
            label: status_label(status, driver_name),
        }
    }

    pub fn for_record(record: Option<&LiveOrderRecord>) -> Self {
        match record {
            Some(record) => Self::for_status(
                Some(record.status),
                record.driver_name.as_deref(),
                record.driver_location.is_some(),
            ),
            None => Self::for_status(None, None, false),
        }
    }
}
