//! Adapter for the standard in-browser position API.

use crate::geolocation::{PositionBackend, PositionError, PositionOptions, PositionSink, WatchId};
use crate::model::GeoResult;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

/// Position as reported to browser success callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrowserPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
}

impl From<BrowserPosition> for GeoResult {
    fn from(position: BrowserPosition) -> Self {
        GeoResult {
            lat: position.latitude,
            lng: position.longitude,
            heading: position.heading,
            speed: position.speed,
        }
    }
}

/// Error as reported to browser error callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserPositionError {
    pub code: u16,
    pub message: String,
}

impl BrowserPositionError {
    pub const PERMISSION_DENIED: u16 = 1;
    pub const POSITION_UNAVAILABLE: u16 = 2;
    pub const TIMEOUT: u16 = 3;

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<BrowserPositionError> for PositionError {
    fn from(e: BrowserPositionError) -> Self {
        match e.code {
            BrowserPositionError::PERMISSION_DENIED => PositionError::PermissionDenied,
            BrowserPositionError::TIMEOUT => PositionError::Timeout,
            _ => PositionError::PositionUnavailable(e.message),
        }
    }
}

pub type SuccessCallback = Box<dyn FnOnce(BrowserPosition) + Send>;
pub type ErrorCallback = Box<dyn FnOnce(BrowserPositionError) + Send>;
pub type WatchSuccessCallback = Arc<dyn Fn(BrowserPosition) + Send + Sync>;
pub type WatchErrorCallback = Arc<dyn Fn(BrowserPositionError) + Send + Sync>;

/// The callback-style position API of a browser script engine.
pub trait BrowserGeolocation: Send + Sync {
    fn get_current_position(
        &self,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
        opts: PositionOptions,
    );

    fn watch_position(
        &self,
        on_success: WatchSuccessCallback,
        on_error: WatchErrorCallback,
        opts: PositionOptions,
    ) -> i64;

    fn clear_watch(&self, id: i64);
}

/// [`PositionBackend`] over a [`BrowserGeolocation`].
///
/// The browser prompts for permission on first use by itself, so there is no
/// separate permission step; a refusal arrives as error code 1.
pub struct BrowserBackend {
    api: Arc<dyn BrowserGeolocation>,
}

impl BrowserBackend {
    pub fn new(api: Arc<dyn BrowserGeolocation>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PositionBackend for BrowserBackend {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn ensure_permission(&self) -> Result<(), PositionError> {
        Ok(())
    }

    async fn current_position(&self, opts: PositionOptions) -> Result<GeoResult, PositionError> {
        let (tx, rx) = oneshot::channel();
        // Either callback may fire, never both; whichever comes first takes the sender.
        let tx = Arc::new(Mutex::new(Some(tx)));
        let on_error_tx = tx.clone();

        self.api.get_current_position(
            Box::new(move |position| {
                if let Some(tx) = tx.lock().ok().and_then(|mut slot| slot.take()) {
                    let _ = tx.send(Ok(GeoResult::from(position)));
                }
            }),
            Box::new(move |error| {
                if let Some(tx) = on_error_tx.lock().ok().and_then(|mut slot| slot.take()) {
                    let _ = tx.send(Err(PositionError::from(error)));
                }
            }),
            opts,
        );

        rx.await.unwrap_or_else(|_| {
            debug!("Browser dropped position callbacks without answering");
            Err(PositionError::PositionUnavailable(
                "no position callback fired".into(),
            ))
        })
    }

    async fn watch_position(
        &self,
        opts: PositionOptions,
        sink: PositionSink,
    ) -> Result<WatchId, PositionError> {
        let error_sink = sink.clone();
        let id = self.api.watch_position(
            Arc::new(move |position| sink(Ok(GeoResult::from(position)))),
            Arc::new(move |error| error_sink(Err(PositionError::from(error)))),
            opts,
        );
        Ok(WatchId::Browser(id))
    }

    async fn clear_watch(&self, id: WatchId) {
        if let WatchId::Browser(id) = id {
            self.api.clear_watch(id);
        }
    }
}
