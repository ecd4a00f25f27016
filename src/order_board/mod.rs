//! In-memory stand-in for the shared order record store.

pub mod actor;
pub mod client;
pub mod error;

pub use actor::*;
pub use client::*;
pub use error::*;

/// Creates a new order board actor and spawns it, returning its client.
pub fn spawn() -> OrderBoardClient {
    let (actor, client) = OrderBoard::new(32);
    tokio::spawn(actor.run());
    client
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, LiveOrderRecord, OrderPatch, OrderStatus};
    use crate::order_sync::LiveOrderSync;

    #[tokio::test]
    async fn patch_of_missing_order_is_not_found() {
        let board = spawn();
        let result = board
            .patch("order_404".into(), OrderPatch::status(OrderStatus::Claimed))
            .await;
        assert_eq!(result, Err(BoardError::NotFound("order_404".into())));
    }

    #[tokio::test]
    async fn subscribers_receive_current_then_every_change() {
        let board = spawn();
        board
            .put(LiveOrderRecord::new("order_1", OrderStatus::Ready))
            .await
            .unwrap();

        let mut sync = LiveOrderSync::subscribe(&board, "order_1".into()).await.unwrap();
        assert_eq!(sync.latest().map(|r| r.status), Some(OrderStatus::Ready));

        board
            .patch(
                "order_1".into(),
                OrderPatch::status(OrderStatus::Claimed)
                    .with_driver("d1", "Sam")
                    .with_location(Coordinates::new(1.0, 2.0)),
            )
            .await
            .unwrap();

        let snapshot = sync.changed().await.unwrap();
        assert_eq!(snapshot.status, OrderStatus::Claimed);
        assert_eq!(snapshot.driver_name.as_deref(), Some("Sam"));
        assert_eq!(snapshot.driver_location, Some(Coordinates::new(1.0, 2.0)));
    }

    #[tokio::test]
    async fn removing_an_order_ends_subscriptions() {
        let board = spawn();
        board
            .put(LiveOrderRecord::new("order_1", OrderStatus::Pending))
            .await
            .unwrap();
        let mut sync = LiveOrderSync::subscribe(&board, "order_1".into()).await.unwrap();

        board.remove("order_1".into()).await.unwrap();
        assert_eq!(sync.changed().await, None);
        assert!(board.get("order_1".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unsubscribed_consumers_stop_receiving() {
        let board = spawn();
        board
            .put(LiveOrderRecord::new("order_1", OrderStatus::Pending))
            .await
            .unwrap();
        let mut sync = LiveOrderSync::subscribe(&board, "order_1".into()).await.unwrap();
        let receiver = sync.receiver();
        sync.unsubscribe();

        board
            .patch("order_1".into(), OrderPatch::status(OrderStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(receiver.borrow().as_ref().map(|r| r.status), Some(OrderStatus::Pending));
    }
}
