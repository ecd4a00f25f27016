//! Route, ETA and map bounds from the driver's position.
//!
//! # Main Components
//!
//! - [`RouteEtaEngine`] - Picks the destination, refits bounds, calls the service
//! - [`RateLimiter`] / [`Clock`] - One request per window, deterministic in tests
//! - [`RouteService`] - The external routing dependency and its reply shape
//! - [`StraightLineRouter`] - Offline stand-in for the routing service

pub mod bounds;
pub mod clock;
pub mod engine;
pub mod error;
pub mod service;
pub mod straight_line;
pub mod throttle;

pub use bounds::*;
pub use clock::*;
pub use engine::*;
pub use error::*;
pub use service::*;
pub use straight_line::*;
pub use throttle::*;
