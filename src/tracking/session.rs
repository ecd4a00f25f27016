use crate::config::TrackerConfig;
use crate::framework::{request, FrameworkError, Response};
use crate::model::{LiveOrderRecord, OrderId, OrderStatus};
use crate::order_sync::{LiveOrderSync, OrderFeed, SyncError};
use crate::routing::{Clock, RouteEtaEngine, RouteInput, RouteService};
use crate::tracking::TrackingView;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument};

/// Statuses in which the driver is moving towards a routing destination.
pub fn routes_driver(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Claimed | OrderStatus::OutForDelivery)
}

#[derive(Debug)]
pub enum SessionCommand {
    Shutdown { respond_to: Response<()> },
}

/// Follows one order and republishes a [`TrackingView`] on every snapshot.
///
/// Combines the live order subscription, the visibility rules and the
/// throttled route engine. Routing is only consulted while the driver is
/// heading somewhere; bounds are refitted on every snapshot.
pub struct TrackingSession {
    commands: mpsc::Receiver<SessionCommand>,
    sync: LiveOrderSync,
    engine: RouteEtaEngine,
    view: watch::Sender<TrackingView>,
}

impl TrackingSession {
    /// Subscribes to `order_id` and builds the session with its handle.
    ///
    /// Nothing is published until [`TrackingSession::run`] is spawned.
    #[instrument(skip(feed, router, clock, config))]
    pub async fn new(
        feed: &dyn OrderFeed,
        order_id: OrderId,
        router: Arc<dyn RouteService>,
        clock: Arc<dyn Clock>,
        config: &TrackerConfig,
    ) -> Result<(Self, TrackingHandle), SyncError> {
        let sync = LiveOrderSync::subscribe(feed, order_id.clone()).await?;
        let engine = RouteEtaEngine::new(router, clock, config.routing.throttle_window())
            .with_mode(config.routing.travel_mode)
            .with_padding(config.bounds_padding_deg);
        let (sender, commands) = mpsc::channel(4);
        let (view, view_rx) = watch::channel(TrackingView::pending(order_id));
        let session = Self {
            commands,
            sync,
            engine,
            view,
        };
        Ok((session, TrackingHandle { sender, view: view_rx }))
    }

    pub async fn run(mut self) {
        info!(order_id = %self.sync.order_id(), "Tracking session started");

        if let Some(record) = self.sync.latest() {
            self.refresh(&record).await;
        }

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown { respond_to }) => {
                        self.sync.unsubscribe();
                        let _ = respond_to.send(Ok(()));
                        break;
                    }
                    None => break,
                },
                snapshot = self.sync.changed() => match snapshot {
                    Some(record) => self.refresh(&record).await,
                    None => {
                        info!(order_id = %self.sync.order_id(), "Order feed closed");
                        break;
                    }
                },
            }
        }

        self.sync.unsubscribe();
        info!(order_id = %self.sync.order_id(), "Tracking session shutdown");
    }

    async fn refresh(&mut self, record: &LiveOrderRecord) {
        let input = RouteInput {
            driver: record.driver_location,
            status: record.status,
            vendor: record.vendor_coordinates,
            delivery: record.delivery_coordinates,
        };
        let estimate = if routes_driver(record.status) {
            self.engine.update(input).await
        } else {
            self.engine.refit(&input);
            self.engine.estimate().clone()
        };

        let view = TrackingView::compose(record.order_id.clone(), Some(record), &estimate);
        let status_changed = self.view.borrow().status != view.status;
        if status_changed {
            info!(
                order_id = %record.order_id,
                status = %record.status,
                show_map = view.show_map,
                show_driver_marker = view.show_driver_marker,
                "Order status changed"
            );
        } else {
            debug!(order_id = %record.order_id, eta = ?view.eta, "Tracking view updated");
        }
        self.view.send_replace(view);
    }
}

/// Caller-side handle of a [`TrackingSession`].
#[derive(Clone)]
pub struct TrackingHandle {
    sender: mpsc::Sender<SessionCommand>,
    view: watch::Receiver<TrackingView>,
}

impl TrackingHandle {
    pub fn view(&self) -> TrackingView {
        self.view.borrow().clone()
    }

    /// A receiver that observes every published view.
    pub fn subscribe(&self) -> watch::Receiver<TrackingView> {
        self.view.clone()
    }

    /// Unsubscribes from the order and stops the session. Later calls are no-ops.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        match request(&self.sender, |respond_to| SessionCommand::Shutdown { respond_to }).await {
            Err(FrameworkError::ActorClosed | FrameworkError::ActorDropped) => Ok(()),
            other => other,
        }
    }
}
