//! # Delivery Tracker
//!
//! > **Live delivery tracking on Tokio actors.**
//!
//! Two independent streams meet here: the driver's position, acquired on
//! whichever platform the app runs on, and the order's lifecycle status,
//! written by other parties into a shared record. This crate keeps both
//! consistent and turns them into a single view: is the map drawn, is the
//! driver marker drawn, what does the label say, how far away is the driver.
//!
//! ## Architecture Notes
//!
//! ### 1. One task per stateful component
//! Position acquisition ([`geolocation::GeolocationActor`]), the in-memory
//! order board ([`order_board::OrderBoard`]) and each tracking session
//! ([`tracking::TrackingSession`]) own their state inside one Tokio task and
//! handle their mailbox sequentially. Handles talk to them with
//! [`framework::request`].
//!
//! ### 2. Late results are dropped, not applied
//! Permission prompts, position requests and watch callbacks run outside the
//! acquisition actor and report back tagged with a session generation. After
//! `stop` or `unmount` the generation moves on and anything still in flight
//! is discarded.
//!
//! ### 3. Strategies at the platform seam
//! [`geolocation::PositionBackend`] has one adapter for the native mobile
//! bridge and one for the browser API. [`geolocation::Platform`] picks one
//! per acquisition session.
//!
//! ### 4. Visibility is a pure function of status
//! [`visibility::MapVisibility`] has no state of its own, so the map can
//! never disagree with the latest snapshot.
//!
//! ### 5. Routing is throttled and best effort
//! [`routing::RouteEtaEngine`] calls the routing service at most once per
//! window and keeps the previous estimate when a call fails.
//!
//! ## Module Tour
//!
//! - [`model`] - Coordinates, position fixes, order records and statuses
//! - [`geolocation`] - Acquisition with retry, backoff and accuracy fallback
//! - [`order_sync`] - Read-only subscription to one shared order record
//! - [`order_board`] - In-memory shared order records
//! - [`visibility`] - Status to map visibility and label
//! - [`routing`] - Throttled route/ETA and map bounds
//! - [`tracking`] - Everything above composed into one view per order
//! - [`config`] - [`config::TrackerConfig`] from JSON and `TRACKER_*` variables
//! - [`lifecycle`] - Tracing setup and system wiring
//! - [`mock`] - Scripted capabilities for tests
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod config;
pub mod framework;
pub mod geolocation;
pub mod lifecycle;
pub mod mock;
pub mod model;
pub mod order_board;
pub mod order_sync;
pub mod routing;
pub mod tracking;
pub mod visibility;
