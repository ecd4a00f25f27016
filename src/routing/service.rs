use crate::model::Coordinates;
use crate::routing::RoutingError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Status string of a successful routing reply.
pub const STATUS_OK: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub mode: TravelMode,
}

/// A `{text, value}` pair as used for durations and distances.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextValue {
    pub text: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl TextValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteLeg {
    pub duration: TextValue,
    pub distance: TextValue,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// Reply of the routing service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    pub fn from_json(body: &str) -> Result<Self, RoutingError> {
        Ok(serde_json::from_str(body)?)
    }

    /// An `OK` reply with a single leg.
    pub fn single_leg(duration: impl Into<String>, distance: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            routes: vec![Route {
                legs: vec![RouteLeg {
                    duration: TextValue::text(duration),
                    distance: TextValue::text(distance),
                }],
            }],
        }
    }

    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            routes: Vec::new(),
        }
    }

    /// The first leg of the first route of an `OK` reply.
    pub fn first_leg(&self) -> Result<&RouteLeg, RoutingError> {
        if self.status != STATUS_OK {
            return Err(RoutingError::Status(self.status.clone()));
        }
        self.routes
            .first()
            .and_then(|route| route.legs.first())
            .ok_or(RoutingError::EmptyRoute)
    }
}

/// The external routing dependency. Costly, so callers rate-limit it.
#[async_trait]
pub trait RouteService: Send + Sync {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RoutingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_directions_style_reply() {
        let body = r#"{
            "status": "OK",
            "routes": [{"legs": [{
                "duration": {"text": "14 mins", "value": 840},
                "distance": {"text": "5.2 km", "value": 5200}
            }]}]
        }"#;
        let response = RouteResponse::from_json(body).unwrap();
        let leg = response.first_leg().unwrap();
        assert_eq!(leg.duration.text, "14 mins");
        assert_eq!(leg.distance.value, Some(5200.0));
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let response = RouteResponse::from_json(r#"{"status":"OVER_QUERY_LIMIT"}"#).unwrap();
        assert_eq!(
            response.first_leg(),
            Err(RoutingError::Status("OVER_QUERY_LIMIT".into()))
        );
    }

    #[test]
    fn ok_without_legs_is_empty() {
        let response = RouteResponse::from_json(r#"{"status":"OK","routes":[{"legs":[]}]}"#).unwrap();
        assert_eq!(response.first_leg(), Err(RoutingError::EmptyRoute));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            RouteResponse::from_json("not json"),
            Err(RoutingError::Decode(_))
        ));
    }
}
