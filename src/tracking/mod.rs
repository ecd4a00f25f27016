//! Order tracking: the live record, visibility and route estimate combined
//! into one view for the rendering surface.
//!
//! Sessions are usually started through
//! [`TrackerSystem::track`](crate::lifecycle::TrackerSystem::track).

pub mod session;
pub mod view;

pub use session::*;
pub use view::*;
