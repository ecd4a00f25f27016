//! The strategy seam between acquisition logic and the two position sources.

use crate::geolocation::{PositionError, PositionOptions};
use crate::model::GeoResult;
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;

/// Receives every update of a continuous watch, success or failure.
pub type PositionSink = Arc<dyn Fn(Result<GeoResult, PositionError>) + Send + Sync>;

/// Backend-issued handle of an active watch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchId {
    Native(String),
    Browser(i64),
}

impl Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchId::Native(id) => write!(f, "native:{}", id),
            WatchId::Browser(id) => write!(f, "browser:{}", id),
        }
    }
}

/// One way of obtaining positions, with its own permission model.
///
/// Implementations normalise every failure to [`PositionError`] so the
/// acquisition actor can apply one retry policy to both.
#[async_trait]
pub trait PositionBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolves permission, prompting if the platform requires it.
    async fn ensure_permission(&self) -> Result<(), PositionError>;

    async fn current_position(&self, opts: PositionOptions) -> Result<GeoResult, PositionError>;

    async fn watch_position(
        &self,
        opts: PositionOptions,
        sink: PositionSink,
    ) -> Result<WatchId, PositionError>;

    async fn clear_watch(&self, id: WatchId);
}
