use crate::model::{LiveOrderRecord, OrderId};
use crate::order_sync::SyncError;
use async_trait::async_trait;
use std::sync::Arc;

/// Receives one complete record snapshot per upstream change.
pub type SnapshotCallback = Arc<dyn Fn(LiveOrderRecord) + Send + Sync>;

/// Cancels a feed subscription when called.
pub struct Unsubscribe(Box<dyn FnOnce() + Send + Sync>);

impl Unsubscribe {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self(Box::new(cancel))
    }

    pub fn call(self) {
        (self.0)()
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Unsubscribe")
    }
}

/// A source of live order records, keyed by order id.
///
/// Transport reconnection is the feed's own business; subscribers only ever
/// see complete snapshots.
#[async_trait]
pub trait OrderFeed: Send + Sync {
    async fn subscribe(
        &self,
        order_id: &OrderId,
        on_change: SnapshotCallback,
    ) -> Result<Unsubscribe, SyncError>;
}
