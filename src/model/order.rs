use crate::model::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of an order in the shared record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an order, from placement to completion or cancellation.
///
/// Values the record store sends that this build does not know about decode
/// to [`OrderStatus::Unknown`] instead of failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    ReadyForPickup,
    Claimed,
    OutForDelivery,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Claimed => "claimed",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the shared order record.
///
/// Owned and mutated outside this crate; every change arrives as one complete
/// snapshot, so status and driver fields are always consistent with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveOrderRecord {
    pub order_id: OrderId,
    pub status: OrderStatus,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_location: Option<Coordinates>,
    #[serde(default)]
    pub vendor_coordinates: Option<Coordinates>,
    #[serde(default)]
    pub delivery_coordinates: Option<Coordinates>,
}

impl LiveOrderRecord {
    pub fn new(order_id: impl Into<OrderId>, status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            status,
            driver_id: None,
            driver_name: None,
            driver_location: None,
            vendor_coordinates: None,
            delivery_coordinates: None,
        }
    }

    /// Applies a producer-side patch. All fields land together.
    pub fn apply(&mut self, patch: OrderPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(driver_id) = patch.driver_id {
            self.driver_id = Some(driver_id);
        }
        if let Some(driver_name) = patch.driver_name {
            self.driver_name = Some(driver_name);
        }
        if let Some(location) = patch.driver_location {
            self.driver_location = Some(location);
        }
    }
}

/// Producer-side change to a record. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub driver_location: Option<Coordinates>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn driver_location(location: Coordinates) -> Self {
        Self {
            driver_location: Some(location),
            ..Self::default()
        }
    }

    pub fn with_driver(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.driver_id = Some(id.into());
        self.driver_name = Some(name.into());
        self
    }

    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.driver_location = Some(location);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_values_decode_to_unknown() {
        let json = r#"{"orderId":"order_9","status":"teleported"}"#;
        let record: LiveOrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, OrderStatus::Unknown);
        assert!(record.driver_location.is_none());
    }

    #[test]
    fn record_decodes_camel_case_fields() {
        let json = r#"{
            "orderId": "order_1",
            "status": "out_for_delivery",
            "driverName": "Sam",
            "driverLocation": {"lat": 51.5, "lng": -0.12}
        }"#;
        let record: LiveOrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, OrderStatus::OutForDelivery);
        assert_eq!(record.driver_name.as_deref(), Some("Sam"));
        assert_eq!(record.driver_location, Some(Coordinates::new(51.5, -0.12)));
    }

    #[test]
    fn patch_updates_only_present_fields() {
        let mut record = LiveOrderRecord::new("order_1", OrderStatus::Ready);
        record.apply(OrderPatch::status(OrderStatus::Claimed).with_driver("d1", "Sam"));
        record.apply(OrderPatch::driver_location(Coordinates::new(1.0, 2.0)));

        assert_eq!(record.status, OrderStatus::Claimed);
        assert_eq!(record.driver_name.as_deref(), Some("Sam"));
        assert_eq!(record.driver_location, Some(Coordinates::new(1.0, 2.0)));
    }
}
