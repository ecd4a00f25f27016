//! Process setup and wiring.
//!
//! # Main Components
//!
//! - [`TrackerSystem`] - Owns the order board and the tracking sessions started on it
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod tracker_system;
pub mod tracing;

pub use self::tracing::*;
pub use tracker_system::*;
