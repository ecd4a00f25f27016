//! Adapter for the position capability exposed by an embedding mobile runtime.

use crate::geolocation::{PositionBackend, PositionError, PositionOptions, PositionSink, WatchId};
use crate::model::GeoResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Permission states reported by the mobile bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
    PromptWithRationale,
}

impl PermissionState {
    pub fn needs_prompt(self) -> bool {
        matches!(self, PermissionState::Prompt | PermissionState::PromptWithRationale)
    }
}

/// Coordinates block of a bridge position payload.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BridgeCoords {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Position payload as delivered by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BridgePosition {
    pub coords: BridgeCoords,
}

impl BridgePosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coords: BridgeCoords {
                latitude,
                longitude,
                heading: None,
                speed: None,
            },
        }
    }
}

impl From<BridgePosition> for GeoResult {
    fn from(position: BridgePosition) -> Self {
        GeoResult {
            lat: position.coords.latitude,
            lng: position.coords.longitude,
            heading: position.coords.heading,
            speed: position.coords.speed,
        }
    }
}

/// A failure reported by the bridge. The bridge carries no error codes, only text.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct BridgeError {
    pub message: String,
}

impl BridgeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<BridgeError> for PositionError {
    fn from(e: BridgeError) -> Self {
        let text = e.message.to_lowercase();
        if text.contains("denied") || text.contains("permission") {
            PositionError::PermissionDenied
        } else if text.contains("timeout") || text.contains("timed out") {
            PositionError::Timeout
        } else if text.contains("not implemented") || text.contains("unsupported") {
            PositionError::Unsupported
        } else {
            PositionError::PositionUnavailable(e.message)
        }
    }
}

/// Callback registered with a bridge watch.
pub type BridgeCallback = Arc<dyn Fn(Result<BridgePosition, BridgeError>) + Send + Sync>;

/// The native position capability of the embedding runtime.
#[async_trait]
pub trait MobileBridge: Send + Sync {
    async fn check_permissions(&self) -> Result<PermissionState, BridgeError>;

    async fn request_permissions(&self) -> Result<PermissionState, BridgeError>;

    async fn get_current_position(
        &self,
        opts: PositionOptions,
    ) -> Result<BridgePosition, BridgeError>;

    async fn watch_position(
        &self,
        opts: PositionOptions,
        callback: BridgeCallback,
    ) -> Result<String, BridgeError>;

    async fn clear_watch(&self, handle: &str) -> Result<(), BridgeError>;
}

/// [`PositionBackend`] over a [`MobileBridge`].
///
/// Permission is checked before every request and prompted for when the
/// bridge reports a prompt state. A refusal is final for this request.
pub struct NativeBackend {
    bridge: Arc<dyn MobileBridge>,
}

impl NativeBackend {
    pub fn new(bridge: Arc<dyn MobileBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl PositionBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn ensure_permission(&self) -> Result<(), PositionError> {
        let mut state = self.bridge.check_permissions().await?;
        debug!(?state, "Checked location permission");
        if state.needs_prompt() {
            state = self.bridge.request_permissions().await?;
            info!(?state, "Requested location permission");
        }
        match state {
            PermissionState::Granted => Ok(()),
            _ => Err(PositionError::PermissionDenied),
        }
    }

    async fn current_position(&self, opts: PositionOptions) -> Result<GeoResult, PositionError> {
        let position = self.bridge.get_current_position(opts).await?;
        Ok(position.into())
    }

    async fn watch_position(
        &self,
        opts: PositionOptions,
        sink: PositionSink,
    ) -> Result<WatchId, PositionError> {
        let callback: BridgeCallback = Arc::new(move |update| {
            sink(update.map(GeoResult::from).map_err(PositionError::from));
        });
        let handle = self.bridge.watch_position(opts, callback).await?;
        Ok(WatchId::Native(handle))
    }

    async fn clear_watch(&self, id: WatchId) {
        match id {
            WatchId::Native(handle) => {
                if let Err(e) = self.bridge.clear_watch(&handle).await {
                    warn!(%handle, error = %e, "Failed to clear native watch");
                }
            }
            other => warn!(watch = %other, "Ignoring foreign watch handle"),
        }
    }
}
