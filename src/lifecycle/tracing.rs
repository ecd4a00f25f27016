//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber filtered by
//! `RUST_LOG`. The target is hidden; structured fields such as `order_id`,
//! `status`, `attempt` and `delay_ms` carry the context instead.
//!
//! ```bash
//! # Lifecycle edges: actors started, status changes, routes refreshed
//! RUST_LOG=info cargo run
//!
//! # Every snapshot, stale event and throttled route request
//! RUST_LOG=debug cargo run
//!
//! # Only the acquisition actor
//! RUST_LOG=delivery_tracker::geolocation=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a tracked delivery reads like:
//!
//! ```text
//! INFO Tracking session started order_id=order_1
//! INFO Order status changed order_id=order_1 status=claimed show_map=true show_driver_marker=true
//! INFO Route refreshed eta=4 mins distance=1.9 km destination=(51.507400, -0.127800)
//! WARN Route request failed; keeping previous estimate error=Routing transport error: offline
//! ```
//!
//! Routing and position failures are logged at `warn` and never reach the
//! user as errors; the user only ever sees the messages of
//! [`PositionError::user_message`](crate::geolocation::PositionError::user_message).
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
