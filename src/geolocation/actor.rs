//! The acquisition actor: one instance per mounted consumer.

use crate::framework::Response;
use crate::geolocation::{
    GeolocationHandle, GeolocationOptions, Platform, PositionBackend, PositionError,
    PositionOptions, PositionSink, RetryEpisode, WatchId,
};
use crate::model::{GeoResult, GeoStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything a consumer can observe about acquisition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoState {
    pub status: GeoStatus,
    pub position: Option<GeoResult>,
    /// User-facing message for the last failure, cleared on success.
    pub error: Option<String>,
    /// Automatic retries used in the current failure episode.
    pub retry_attempts: u32,
}

/// Requests sent by a [`GeolocationHandle`].
#[derive(Debug)]
pub enum GeoCommand {
    Start {
        high_accuracy: bool,
        respond_to: Response<()>,
    },
    Stop {
        respond_to: Response<()>,
    },
    Retry {
        respond_to: Response<()>,
    },
    Unmount {
        respond_to: Response<()>,
    },
}

/// Results reported back by spawned requests, timers and watch callbacks.
///
/// Every event carries the session generation it was issued under; events
/// from an older generation arrive after a stop or restart and are dropped.
#[derive(Debug)]
enum GeoEvent {
    Fix { generation: u64, fix: GeoResult },
    Failed { generation: u64, error: PositionError },
    Watching { generation: u64, id: WatchId },
    RetryDue { generation: u64 },
}

/// Owns acquisition state and serialises every command and backend result.
///
/// The backend is resolved from the [`Platform`] once, when the actor is
/// created. Permission prompts and position requests run in spawned tasks
/// so `stop` and `unmount` are never blocked behind them.
pub struct GeolocationActor {
    commands: mpsc::Receiver<GeoCommand>,
    events: mpsc::UnboundedReceiver<GeoEvent>,
    event_tx: mpsc::UnboundedSender<GeoEvent>,
    state: watch::Sender<GeoState>,
    backend: Option<Arc<dyn PositionBackend>>,
    options: GeolocationOptions,
    high_accuracy: bool,
    generation: u64,
    episode: RetryEpisode,
    retry_timer: Option<JoinHandle<()>>,
    active_watch: Option<WatchId>,
}

impl GeolocationActor {
    /// Creates an actor and the handle that drives it.
    ///
    /// Nothing happens until [`GeolocationActor::run`] is spawned.
    pub fn new(platform: &Platform, options: GeolocationOptions) -> (Self, GeolocationHandle) {
        let (sender, commands) = mpsc::channel(16);
        let (event_tx, events) = mpsc::unbounded_channel();
        let (state, state_rx) = watch::channel(GeoState::default());
        let actor = Self {
            commands,
            events,
            event_tx,
            state,
            backend: platform.resolve(),
            options,
            high_accuracy: options.enable_high_accuracy,
            generation: 0,
            episode: RetryEpisode::default(),
            retry_timer: None,
            active_watch: None,
        };
        (actor, GeolocationHandle::new(sender, state_rx))
    }

    /// Runs until the handle unmounts or every handle is dropped.
    ///
    /// Both exits go through `stop`, so a pending retry timer and an active
    /// watch are always released.
    pub async fn run(mut self) {
        let backend = self.backend.as_ref().map(|b| b.name()).unwrap_or("none");
        info!(backend, watch = self.options.watch, "Geolocation actor started");

        if self.options.auto_start {
            self.start(self.options.enable_high_accuracy, false).await;
        }

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(GeoCommand::Start { high_accuracy, respond_to }) => {
                        self.start(high_accuracy, false).await;
                        let _ = respond_to.send(Ok(()));
                    }
                    Some(GeoCommand::Stop { respond_to }) => {
                        self.stop().await;
                        let _ = respond_to.send(Ok(()));
                    }
                    Some(GeoCommand::Retry { respond_to }) => {
                        info!("Manual retry requested");
                        self.episode.reset();
                        self.start(self.high_accuracy, false).await;
                        let _ = respond_to.send(Ok(()));
                    }
                    Some(GeoCommand::Unmount { respond_to }) => {
                        self.stop().await;
                        let _ = respond_to.send(Ok(()));
                        break;
                    }
                    None => {
                        self.stop().await;
                        break;
                    }
                },
                Some(event) = self.events.recv() => self.handle_event(event).await,
            }
        }

        // Watches registered while the loop was exiting have nobody left to clear them.
        self.events.close();
        while let Ok(event) = self.events.try_recv() {
            if let (GeoEvent::Watching { id, .. }, Some(backend)) = (event, &self.backend) {
                debug!(watch = %id, "Clearing watch registered during shutdown");
                backend.clear_watch(id).await;
            }
        }

        info!(status = ?self.state.borrow().status, "Geolocation actor shutdown");
    }

    async fn start(&mut self, high_accuracy: bool, scheduled: bool) {
        self.cancel_retry_timer();
        self.clear_active_watch().await;
        self.generation += 1;
        self.high_accuracy = high_accuracy;

        let Some(backend) = self.backend.clone() else {
            warn!("No position capability in this environment");
            self.publish(|s| {
                s.status = GeoStatus::Unsupported;
                s.error = Some(PositionError::Unsupported.user_message().to_string());
            });
            return;
        };

        // Scheduled retries keep the failure status; only a fresh start shows loading.
        if !scheduled {
            self.publish(|s| {
                s.status = GeoStatus::Loading;
                s.error = None;
            });
        }

        let opts = self.options.request(high_accuracy);
        let generation = self.generation;
        let events = self.event_tx.clone();
        debug!(generation, high_accuracy, watch = self.options.watch, "Starting acquisition");

        if self.options.watch {
            tokio::spawn(open_watch(backend, opts, generation, events));
        } else {
            tokio::spawn(async move {
                let event = match acquire_once(backend.as_ref(), opts).await {
                    Ok(fix) => GeoEvent::Fix { generation, fix },
                    Err(error) => GeoEvent::Failed { generation, error },
                };
                let _ = events.send(event);
            });
        }
    }

    async fn stop(&mut self) {
        self.generation += 1;
        self.cancel_retry_timer();
        self.clear_active_watch().await;
    }

    async fn handle_event(&mut self, event: GeoEvent) {
        match event {
            GeoEvent::Fix { generation, fix } if generation == self.generation => {
                self.episode.reset();
                self.cancel_retry_timer();
                debug!(lat = fix.lat, lng = fix.lng, "Position fix");
                self.publish(|s| {
                    s.status = GeoStatus::Granted;
                    s.position = Some(fix);
                    s.error = None;
                    s.retry_attempts = 0;
                });
            }
            GeoEvent::Failed { generation, error } if generation == self.generation => {
                self.fail(error).await;
            }
            GeoEvent::Watching { generation, id } => {
                if generation == self.generation {
                    debug!(watch = %id, "Watch registered");
                    self.active_watch = Some(id);
                } else if let Some(backend) = &self.backend {
                    debug!(watch = %id, "Clearing watch registered after stop");
                    backend.clear_watch(id).await;
                }
            }
            GeoEvent::RetryDue { generation } if generation == self.generation => {
                self.retry_timer = None;
                info!(attempt = self.episode.attempts(), "Retrying position acquisition");
                self.start(self.high_accuracy, true).await;
            }
            stale => debug!(?stale, current = self.generation, "Discarding stale event"),
        }
    }

    async fn fail(&mut self, error: PositionError) {
        let status = error.status();
        let message = error.user_message().to_string();

        if status.is_terminal() {
            warn!(error = %error, ?status, "Position acquisition failed permanently");
            // Nothing from this session may change the status until a retry or start.
            self.generation += 1;
            self.cancel_retry_timer();
            self.clear_active_watch().await;
            self.publish(|s| {
                s.status = status;
                s.error = Some(message);
            });
            return;
        }

        // Watches can report the same failure repeatedly; one pending retry is enough.
        if self.retry_timer.is_none() {
            match self.episode.schedule(&error) {
                Some(delay) => self.schedule_retry(delay),
                None => warn!(
                    error = %error,
                    attempts = self.episode.attempts(),
                    "Retry budget exhausted; waiting for manual retry"
                ),
            }
        }

        let attempts = self.episode.attempts();
        self.publish(|s| {
            s.status = status;
            s.error = Some(message);
            s.retry_attempts = attempts;
        });
    }

    fn schedule_retry(&mut self, delay: Duration) {
        let generation = self.generation;
        let events = self.event_tx.clone();
        info!(
            attempt = self.episode.attempts(),
            delay_ms = delay.as_millis() as u64,
            "Scheduling position retry"
        );
        self.retry_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(GeoEvent::RetryDue { generation });
        }));
    }

    fn cancel_retry_timer(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            debug!("Cancelling pending retry");
            timer.abort();
        }
    }

    async fn clear_active_watch(&mut self) {
        if let (Some(id), Some(backend)) = (self.active_watch.take(), &self.backend) {
            info!(watch = %id, "Clearing position watch");
            backend.clear_watch(id).await;
        }
    }

    fn publish(&self, update: impl FnOnce(&mut GeoState)) {
        self.state.send_modify(update);
    }
}

/// One fix, with a single relaxed retry when a high-accuracy request fails.
///
/// The relaxed request is not part of the retry episode. Permission refusals
/// skip it since accuracy does not change the answer.
async fn acquire_once(
    backend: &dyn PositionBackend,
    opts: PositionOptions,
) -> Result<GeoResult, PositionError> {
    backend.ensure_permission().await?;
    match backend.current_position(opts).await {
        Ok(fix) => Ok(fix),
        Err(error) if opts.enable_high_accuracy && error != PositionError::PermissionDenied => {
            debug!(error = %error, "High-accuracy fix failed, trying low accuracy");
            backend.current_position(opts.relaxed()).await
        }
        Err(error) => Err(error),
    }
}

async fn open_watch(
    backend: Arc<dyn PositionBackend>,
    opts: PositionOptions,
    generation: u64,
    events: mpsc::UnboundedSender<GeoEvent>,
) {
    if let Err(error) = backend.ensure_permission().await {
        let _ = events.send(GeoEvent::Failed { generation, error });
        return;
    }

    let sink_events = events.clone();
    let sink: PositionSink = Arc::new(move |update| {
        let event = match update {
            Ok(fix) => GeoEvent::Fix { generation, fix },
            Err(error) => GeoEvent::Failed { generation, error },
        };
        // The actor may already be gone; late watch callbacks are dropped here.
        let _ = sink_events.send(event);
    });

    let event = match backend.watch_position(opts, sink).await {
        Ok(id) => GeoEvent::Watching { generation, id },
        Err(error) => GeoEvent::Failed { generation, error },
    };
    if let Err(mpsc::error::SendError(GeoEvent::Watching { id, .. })) = events.send(event) {
        debug!(watch = %id, "Actor gone before the watch registered; clearing it");
        backend.clear_watch(id).await;
    }
}
