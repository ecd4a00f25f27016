use crate::framework::request;
use crate::model::{LiveOrderRecord, OrderId, OrderPatch};
use crate::order_board::{BoardError, BoardRequest};
use crate::order_sync::{OrderFeed, SnapshotCallback, SyncError, Unsubscribe};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Client for the [`OrderBoard`](crate::order_board::OrderBoard) actor.
///
/// Producers use `put` and `patch`; consumers go through the [`OrderFeed`]
/// implementation.
#[derive(Clone)]
pub struct OrderBoardClient {
    sender: mpsc::Sender<BoardRequest>,
}

impl OrderBoardClient {
    pub fn new(sender: mpsc::Sender<BoardRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self, record), fields(order_id = %record.order_id))]
    pub async fn put(&self, record: LiveOrderRecord) -> Result<(), BoardError> {
        debug!("Sending request");
        request(&self.sender, |respond_to| BoardRequest::Put { record, respond_to })
            .await
            .map_err(BoardError::from)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, order_id: OrderId) -> Result<Option<LiveOrderRecord>, BoardError> {
        debug!("Sending request");
        request(&self.sender, |respond_to| BoardRequest::Get { order_id, respond_to })
            .await
            .map_err(BoardError::from)
    }

    /// Applies a patch and returns the resulting snapshot.
    #[instrument(skip(self))]
    pub async fn patch(
        &self,
        order_id: OrderId,
        patch: OrderPatch,
    ) -> Result<LiveOrderRecord, BoardError> {
        debug!("Sending request");
        request(&self.sender, |respond_to| BoardRequest::Patch {
            order_id,
            patch,
            respond_to,
        })
        .await
        .map_err(BoardError::from)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, order_id: OrderId) -> Result<(), BoardError> {
        debug!("Sending request");
        request(&self.sender, |respond_to| BoardRequest::Remove { order_id, respond_to })
            .await
            .map_err(BoardError::from)
    }
}

#[async_trait]
impl OrderFeed for OrderBoardClient {
    async fn subscribe(
        &self,
        order_id: &OrderId,
        on_change: SnapshotCallback,
    ) -> Result<Unsubscribe, SyncError> {
        let active = Arc::new(AtomicBool::new(true));
        let subscriber = request(&self.sender, |respond_to| BoardRequest::Subscribe {
            order_id: order_id.clone(),
            on_change,
            active: active.clone(),
            respond_to,
        })
        .await
        .map_err(|e| SyncError::FeedUnavailable(e.to_string()))?;

        let sender = self.sender.clone();
        let order_id = order_id.clone();
        Ok(Unsubscribe::new(move || {
            // The flag stops delivery at once; the message only prunes the entry.
            active.store(false, Ordering::Release);
            if let Err(e) = sender.try_send(BoardRequest::Unsubscribe {
                order_id,
                subscriber,
            }) {
                debug!(error = %e, "Board will prune subscriber lazily");
            }
        }))
    }
}
