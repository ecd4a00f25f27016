//! Error types for the routing dependency.

use thiserror::Error;

/// Failures of a routing call. Never shown to the user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoutingError {
    /// The request did not reach the service or the reply never came back.
    #[error("Routing transport error: {0}")]
    Transport(String),

    /// The service answered with a status other than `OK`.
    #[error("Routing service returned status {0}")]
    Status(String),

    /// An `OK` reply without any route leg.
    #[error("Routing response contained no route")]
    EmptyRoute,

    /// The reply body could not be decoded.
    #[error("Routing response could not be decoded: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for RoutingError {
    fn from(e: serde_json::Error) -> Self {
        RoutingError::Decode(e.to_string())
    }
}
