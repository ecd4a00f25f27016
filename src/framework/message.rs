use crate::framework::FrameworkError;
use tokio::sync::{mpsc, oneshot};

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Sends a request built around a fresh response channel and waits for the reply.
///
/// `make` receives the sending half of the response channel and must embed it
/// in the message. A closed mailbox maps to [`FrameworkError::ActorClosed`], a
/// reply channel dropped without an answer to [`FrameworkError::ActorDropped`].
pub async fn request<M, T>(
    sender: &mpsc::Sender<M>,
    make: impl FnOnce(Response<T>) -> M,
) -> Result<T, FrameworkError> {
    let (respond_to, response) = oneshot::channel();
    sender
        .send(make(respond_to))
        .await
        .map_err(|_| FrameworkError::ActorClosed)?;
    response.await.map_err(|_| FrameworkError::ActorDropped)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Ping {
        Ping { respond_to: Response<u32> },
    }

    #[tokio::test]
    async fn request_round_trips_through_mailbox() {
        let (sender, mut receiver) = mpsc::channel::<Ping>(4);
        tokio::spawn(async move {
            while let Some(Ping::Ping { respond_to }) = receiver.recv().await {
                let _ = respond_to.send(Ok(7));
            }
        });

        let reply = request(&sender, |respond_to| Ping::Ping { respond_to }).await;
        assert_eq!(reply, Ok(7));
    }

    #[tokio::test]
    async fn closed_mailbox_reports_actor_closed() {
        let (sender, receiver) = mpsc::channel::<Ping>(1);
        drop(receiver);

        let reply = request(&sender, |respond_to| Ping::Ping { respond_to }).await;
        assert_eq!(reply, Err(FrameworkError::ActorClosed));
    }

    #[tokio::test]
    async fn dropped_reply_reports_actor_dropped() {
        let (sender, mut receiver) = mpsc::channel::<Ping>(1);
        tokio::spawn(async move {
            // Swallow the request without answering.
            let _ = receiver.recv().await;
        });

        let reply = request(&sender, |respond_to| Ping::Ping { respond_to }).await;
        assert_eq!(reply, Err(FrameworkError::ActorDropped));
    }
}
