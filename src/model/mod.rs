//! Pure data structures shared by every tracking component.

pub mod geo;
pub mod order;

pub use geo::*;
pub use order::*;
