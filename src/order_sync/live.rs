use crate::model::{LiveOrderRecord, OrderId};
use crate::order_sync::{OrderFeed, SnapshotCallback, SyncError, Unsubscribe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Read-only view of one shared order record.
///
/// Holds the latest snapshot and notifies on change. Once unsubscribed (or
/// dropped) no further snapshot is published, even if the feed still has one
/// in flight.
pub struct LiveOrderSync {
    order_id: OrderId,
    latest: watch::Receiver<Option<LiveOrderRecord>>,
    mounted: Arc<AtomicBool>,
    unsubscribe: Option<Unsubscribe>,
}

impl LiveOrderSync {
    #[instrument(skip(feed))]
    pub async fn subscribe(feed: &dyn OrderFeed, order_id: OrderId) -> Result<Self, SyncError> {
        let (tx, mut latest) = watch::channel(None);
        let mounted = Arc::new(AtomicBool::new(true));

        let guard = mounted.clone();
        let on_change: SnapshotCallback = Arc::new(move |record| {
            if guard.load(Ordering::Acquire) {
                debug!(order_id = %record.order_id, status = %record.status, "Order snapshot");
                tx.send_replace(Some(record));
            }
        });

        let unsubscribe = feed.subscribe(&order_id, on_change).await?;
        // A feed may deliver the current snapshot during subscribe; `changed` waits past it.
        let _ = latest.borrow_and_update();
        info!(%order_id, "Subscribed to order");

        Ok(Self {
            order_id,
            latest,
            mounted,
            unsubscribe: Some(unsubscribe),
        })
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// The most recent snapshot, if any has arrived yet.
    pub fn latest(&self) -> Option<LiveOrderRecord> {
        self.latest.borrow().clone()
    }

    /// A receiver that observes every snapshot.
    pub fn receiver(&self) -> watch::Receiver<Option<LiveOrderRecord>> {
        self.latest.clone()
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once unsubscribed or when the feed drops the subscription.
    pub async fn changed(&mut self) -> Option<LiveOrderRecord> {
        if !self.is_subscribed() {
            return None;
        }
        self.latest.changed().await.ok()?;
        self.latest.borrow_and_update().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.unsubscribe.is_some()
    }

    /// Ends the subscription. Only the first call reaches the feed.
    pub fn unsubscribe(&mut self) {
        self.mounted.store(false, Ordering::Release);
        if let Some(unsubscribe) = self.unsubscribe.take() {
            info!(order_id = %self.order_id, "Unsubscribed from order");
            unsubscribe.call();
        }
    }
}

impl Drop for LiveOrderSync {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
