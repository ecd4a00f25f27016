use crate::config::TrackerConfig;
use crate::model::OrderId;
use crate::order_board::{self, OrderBoardClient};
use crate::order_sync::SyncError;
use crate::routing::{RouteService, SystemClock};
use crate::tracking::{TrackingHandle, TrackingSession};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Wires the in-memory order board, a routing service and any number of
/// tracking sessions together.
///
/// # Example
///
/// ```ignore
/// let system = TrackerSystem::new(TrackerConfig::default(), Arc::new(StraightLineRouter::new(30.0)));
/// system.board.put(record).await?;
/// let tracking = system.track("order_1".into()).await?;
/// // ... producers patch the board, the view follows ...
/// system.shutdown().await?;
/// ```
pub struct TrackerSystem {
    /// Producer-side access to the shared order records.
    pub board: OrderBoardClient,
    router: Arc<dyn RouteService>,
    config: TrackerConfig,
    sessions: Vec<TrackingHandle>,
    handles: Vec<JoinHandle<()>>,
}

impl TrackerSystem {
    /// Starts the order board. Sessions are started with [`TrackerSystem::track`].
    pub fn new(config: TrackerConfig, router: Arc<dyn RouteService>) -> Self {
        let (board_actor, board) = order_board::OrderBoard::new(32);
        let board_handle = tokio::spawn(board_actor.run());
        Self {
            board,
            router,
            config,
            sessions: Vec::new(),
            handles: vec![board_handle],
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Starts a tracking session for `order_id`.
    pub async fn track(&mut self, order_id: OrderId) -> Result<TrackingHandle, SyncError> {
        let (session, handle) = TrackingSession::new(
            &self.board,
            order_id,
            self.router.clone(),
            Arc::new(SystemClock::new()),
            &self.config,
        )
        .await?;
        self.handles.push(tokio::spawn(session.run()));
        self.sessions.push(handle.clone());
        Ok(handle)
    }

    /// Stops every session, then the board, and waits for all tasks.
    pub async fn shutdown(self) -> Result<(), String> {
        info!(sessions = self.sessions.len(), "Shutting down tracker...");

        for session in &self.sessions {
            session.shutdown().await.map_err(|e| e.to_string())?;
        }
        drop(self.sessions);
        // The board exits once its last client is gone.
        drop(self.board);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Tracker task failed: {:?}", e);
                return Err(format!("Tracker task failed: {:?}", e));
            }
        }

        info!("Tracker shutdown complete.");
        Ok(())
    }
}
