use crate::framework::{request, FrameworkError};
use crate::geolocation::{GeoCommand, GeoState};
use tokio::sync::{mpsc, watch};
use tracing::instrument;

/// Caller-side handle of a [`GeolocationActor`](crate::geolocation::GeolocationActor).
///
/// Dropping the last handle unmounts the actor.
#[derive(Clone)]
pub struct GeolocationHandle {
    sender: mpsc::Sender<GeoCommand>,
    state: watch::Receiver<GeoState>,
}

impl GeolocationHandle {
    pub(crate) fn new(sender: mpsc::Sender<GeoCommand>, state: watch::Receiver<GeoState>) -> Self {
        Self { sender, state }
    }

    /// Starts a fresh acquisition, replacing any running one.
    #[instrument(skip(self))]
    pub async fn start(&self, high_accuracy: bool) -> Result<(), FrameworkError> {
        request(&self.sender, |respond_to| GeoCommand::Start {
            high_accuracy,
            respond_to,
        })
        .await
    }

    /// Stops acquisition. Safe to call any number of times.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), FrameworkError> {
        request(&self.sender, |respond_to| GeoCommand::Stop { respond_to }).await
    }

    /// Resets the retry episode and immediately attempts a new fix.
    #[instrument(skip(self))]
    pub async fn retry(&self) -> Result<(), FrameworkError> {
        request(&self.sender, |respond_to| GeoCommand::Retry { respond_to }).await
    }

    /// Stops acquisition and shuts the actor down.
    #[instrument(skip(self))]
    pub async fn unmount(self) -> Result<(), FrameworkError> {
        request(&self.sender, |respond_to| GeoCommand::Unmount { respond_to }).await
    }

    /// Latest published state.
    pub fn state(&self) -> GeoState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<GeoState> {
        self.state.clone()
    }
}
