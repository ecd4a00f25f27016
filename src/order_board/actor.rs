use crate::framework::{FrameworkError, Response};
use crate::model::{LiveOrderRecord, OrderId, OrderPatch};
use crate::order_board::OrderBoardClient;
use crate::order_sync::SnapshotCallback;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Messages understood by the [`OrderBoard`] actor.
pub enum BoardRequest {
    Put {
        record: LiveOrderRecord,
        respond_to: Response<()>,
    },
    Get {
        order_id: OrderId,
        respond_to: Response<Option<LiveOrderRecord>>,
    },
    Patch {
        order_id: OrderId,
        patch: OrderPatch,
        respond_to: Response<LiveOrderRecord>,
    },
    Remove {
        order_id: OrderId,
        respond_to: Response<()>,
    },
    Subscribe {
        order_id: OrderId,
        on_change: SnapshotCallback,
        active: Arc<AtomicBool>,
        respond_to: Response<u64>,
    },
    Unsubscribe {
        order_id: OrderId,
        subscriber: u64,
    },
}

struct Subscriber {
    id: u64,
    active: Arc<AtomicBool>,
    on_change: SnapshotCallback,
}

#[derive(Default)]
struct Entry {
    record: Option<LiveOrderRecord>,
    subscribers: Vec<Subscriber>,
}

impl Entry {
    /// Pushes the current snapshot to every live subscriber.
    fn publish(&mut self) {
        self.subscribers.retain(|s| s.active.load(Ordering::Acquire));
        if let Some(record) = &self.record {
            for subscriber in &self.subscribers {
                (subscriber.on_change)(record.clone());
            }
        }
    }
}

/// In-memory shared order record store.
///
/// Plays the part of the server-held document store: producers put and patch
/// records, consumers subscribe and receive a full snapshot after every
/// change. All mutation happens inside this actor's task, so each snapshot is
/// internally consistent.
pub struct OrderBoard {
    receiver: mpsc::Receiver<BoardRequest>,
    entries: HashMap<OrderId, Entry>,
    next_subscriber: u64,
}

impl OrderBoard {
    pub fn new(buffer_size: usize) -> (Self, OrderBoardClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            entries: HashMap::new(),
            next_subscriber: 1,
        };
        (actor, OrderBoardClient::new(sender))
    }

    /// Runs until every client is dropped.
    pub async fn run(mut self) {
        info!("Order board started");

        while let Some(request) = self.receiver.recv().await {
            self.handle(request);
        }

        info!(orders = self.entries.len(), "Order board shutdown");
    }

    fn handle(&mut self, request: BoardRequest) {
        match request {
            BoardRequest::Put { record, respond_to } => {
                let order_id = record.order_id.clone();
                info!(%order_id, status = %record.status, "Put");
                let entry = self.entries.entry(order_id).or_default();
                entry.record = Some(record);
                entry.publish();
                let _ = respond_to.send(Ok(()));
            }
            BoardRequest::Get { order_id, respond_to } => {
                let record = self.entries.get(&order_id).and_then(|e| e.record.clone());
                debug!(%order_id, found = record.is_some(), "Get");
                let _ = respond_to.send(Ok(record));
            }
            BoardRequest::Patch {
                order_id,
                patch,
                respond_to,
            } => {
                debug!(%order_id, ?patch, "Patch");
                let patched = self.entries.get_mut(&order_id).and_then(|entry| {
                    let record = entry.record.as_mut()?;
                    record.apply(patch);
                    let snapshot = record.clone();
                    entry.publish();
                    Some(snapshot)
                });
                match patched {
                    Some(snapshot) => {
                        info!(%order_id, status = %snapshot.status, "Patched");
                        let _ = respond_to.send(Ok(snapshot));
                    }
                    None => {
                        warn!(%order_id, "Not found");
                        let _ = respond_to
                            .send(Err(FrameworkError::NotFound(order_id.to_string())));
                    }
                }
            }
            BoardRequest::Remove { order_id, respond_to } => {
                // Dropping the entry drops its callbacks, which ends every subscription.
                let existed = self.entries.remove(&order_id).is_some();
                info!(%order_id, existed, "Removed");
                let _ = respond_to.send(Ok(()));
            }
            BoardRequest::Subscribe {
                order_id,
                on_change,
                active,
                respond_to,
            } => {
                let id = self.next_subscriber;
                self.next_subscriber += 1;
                let entry = self.entries.entry(order_id.clone()).or_default();
                if let Some(record) = &entry.record {
                    on_change(record.clone());
                }
                entry.subscribers.push(Subscriber {
                    id,
                    active,
                    on_change,
                });
                info!(%order_id, subscriber = id, total = entry.subscribers.len(), "Subscribed");
                let _ = respond_to.send(Ok(id));
            }
            BoardRequest::Unsubscribe {
                order_id,
                subscriber,
            } => {
                if let Some(entry) = self.entries.get_mut(&order_id) {
                    entry.subscribers.retain(|s| s.id != subscriber);
                    debug!(%order_id, subscriber, remaining = entry.subscribers.len(), "Unsubscribed");
                    // Entries created only to hold subscribers go with the last one.
                    if entry.record.is_none() && entry.subscribers.is_empty() {
                        self.entries.remove(&order_id);
                    }
                }
            }
        }
    }
}
