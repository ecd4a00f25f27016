//! Error types for order record subscriptions.

use crate::model::OrderId;
use thiserror::Error;

/// Errors raised while subscribing to a shared order record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    /// The feed refused the subscription because the order does not exist.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The record feed could not be reached.
    #[error("Order feed unavailable: {0}")]
    FeedUnavailable(String),
}
