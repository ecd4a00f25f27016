//! Read-only subscription to the externally mutated order record.
//!
//! [`OrderFeed`] is the interface of the shared record store;
//! [`LiveOrderSync`] is the consumer side, exposing the latest snapshot and
//! unsubscribing exactly once.

pub mod error;
pub mod feed;
pub mod live;

pub use error::*;
pub use feed::*;
pub use live::*;
