//! Actor plumbing shared by the stateful components.
//!
//! Each stateful component (geolocation acquisition, the in-memory order
//! board, tracking sessions) owns its state inside one Tokio task and processes its mailbox
//! sequentially. Handles talk to it through a bounded `mpsc` channel and get
//! replies on a `oneshot` channel.
//!
//! # Main Components
//!
//! - [`FrameworkError`] - Mailbox and reply failures
//! - [`Response`] - Reply channel carried inside every request
//! - [`request`] - Send-and-wait helper used by every handle

pub mod error;
pub mod message;

pub use error::*;
pub use message::*;
