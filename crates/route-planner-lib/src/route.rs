//! Route requests, computed routes and the routing status taxonomy

use crate::{Bounds, LatLng, format};

/// Largest number of intermediate stops a single route request may carry
pub const MAX_WAYPOINTS: usize = 25;

/// How the route is travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelMode {
    #[default]
    Driving,
}

/// An intermediate stop in a route request
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteWaypoint {
    pub location: LatLng,
    pub stopover: bool,
}

/// A fully normalized routing request, ready for a directions provider
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteRequest {
    pub origin: LatLng,
    pub destination: LatLng,
    pub waypoints: Vec<RouteWaypoint>,
    /// Let the provider reorder the waypoints for the shortest total path
    pub optimize_waypoints: bool,
    pub travel_mode: TravelMode,
}

/// Result status of a directions computation, mapped 1:1 to a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RouteStatus {
    /// One of the locations could not be matched
    NotFound,
    /// No route connects the locations
    ZeroResults,
    /// Too many intermediate stops
    MaxWaypointsExceeded,
    /// The request was malformed
    InvalidRequest,
    /// The provider is rate limiting us
    OverQueryLimit,
    /// The provider refused the request
    RequestDenied,
    /// The provider failed internally
    ServerError,
    /// Anything else
    Unknown,
}

impl RouteStatus {
    /// Map a status code in the common `SCREAMING_SNAKE_CASE` convention
    pub fn from_code(code: &str) -> Self {
        match code {
            "NOT_FOUND" => Self::NotFound,
            "ZERO_RESULTS" => Self::ZeroResults,
            "MAX_WAYPOINTS_EXCEEDED" => Self::MaxWaypointsExceeded,
            "INVALID_REQUEST" => Self::InvalidRequest,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            "REQUEST_DENIED" => Self::RequestDenied,
            "UNKNOWN_ERROR" => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Message shown to the user when a route could not be computed
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "At least one of the locations could not be found",
            Self::ZeroResults => "No route could be found between the origin and destination",
            Self::MaxWaypointsExceeded => "Too many waypoints were provided for this route",
            Self::InvalidRequest => "The route request was invalid",
            Self::OverQueryLimit => "Too many route requests. Please try again later",
            Self::RequestDenied => "The route request was denied",
            Self::ServerError => "A server error occurred while calculating the route. Please try again",
            Self::Unknown => "An unknown error occurred while calculating the route",
        }
    }
}

impl std::fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A distance with its display text
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distance {
    pub text: String,
    pub meters: f64,
}

impl Distance {
    pub fn from_meters(meters: f64) -> Self {
        Self {
            text: format::format_distance(meters),
            meters,
        }
    }
}

/// A duration with its display text
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TravelTime {
    pub text: String,
    pub seconds: f64,
}

impl TravelTime {
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            text: format::format_duration(seconds),
            seconds,
        }
    }
}

/// One leg of a route, between two consecutive stops
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteLeg {
    pub start_address: String,
    pub end_address: String,
    pub start_location: LatLng,
    pub end_location: LatLng,
    pub distance: Distance,
    pub duration: TravelTime,
}

/// One alternative route
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub summary: String,
    pub legs: Vec<RouteLeg>,
    /// Polyline of the whole route
    pub path: Vec<LatLng>,
    pub bounds: Bounds,
    /// Visit order of the request's waypoints (indices into the request list)
    pub waypoint_order: Vec<usize>,
}

impl Route {
    pub fn total_distance_meters(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance.meters).sum()
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.legs.iter().map(|leg| leg.duration.seconds).sum()
    }

    /// Where the route starts, according to the provider
    pub fn start_location(&self) -> Option<LatLng> {
        self.legs.first().map(|leg| leg.start_location)
    }

    /// Where the route ends, according to the provider
    pub fn end_location(&self) -> Option<LatLng> {
        self.legs.last().map(|leg| leg.end_location)
    }

    /// Intermediate stops in visit order (the end of every leg except the last)
    pub fn via_locations(&self) -> impl Iterator<Item = &RouteLeg> {
        let count = self.legs.len().saturating_sub(1);
        self.legs.iter().take(count)
    }
}

/// Raw successful answer of a directions provider
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct DirectionsResponse {
    pub routes: Vec<Route>,
}

/// A validated route computation: at least one route, each with at least one leg
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "DirectionsResponse"))]
pub struct RouteResult {
    routes: Vec<Route>,
}

impl TryFrom<DirectionsResponse> for RouteResult {
    type Error = RouteStatus;

    fn try_from(response: DirectionsResponse) -> Result<Self, Self::Error> {
        Self::from_response(response)
    }
}

impl RouteResult {
    /// Validate a provider response
    ///
    /// Routes without legs are dropped. A response with no usable route is reported as
    /// [`RouteStatus::ZeroResults`].
    pub fn from_response(response: DirectionsResponse) -> Result<Self, RouteStatus> {
        let routes: Vec<Route> = response
            .routes
            .into_iter()
            .filter(|route| !route.legs.is_empty())
            .collect();

        if routes.is_empty() {
            return Err(RouteStatus::ZeroResults);
        }

        Ok(Self { routes })
    }

    /// All alternatives, primary first
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn primary(&self) -> &Route {
        &self.routes[0]
    }

    /// First leg of the primary route
    pub fn primary_leg(&self) -> &RouteLeg {
        &self.primary().legs[0]
    }

    pub fn distance_text(&self) -> &str {
        &self.primary_leg().distance.text
    }

    pub fn duration_text(&self) -> &str {
        &self.primary_leg().duration.text
    }

    /// Combined distance of every leg of the primary route
    pub fn total_distance_text(&self) -> String {
        format::format_distance(self.primary().total_distance_meters())
    }

    /// Combined duration of every leg of the primary route
    pub fn total_duration_text(&self) -> String {
        format::format_duration(self.primary().total_duration_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_route;

    #[test]
    fn test_status_codes_map_one_to_one() {
        let codes = [
            ("NOT_FOUND", RouteStatus::NotFound),
            ("ZERO_RESULTS", RouteStatus::ZeroResults),
            ("MAX_WAYPOINTS_EXCEEDED", RouteStatus::MaxWaypointsExceeded),
            ("INVALID_REQUEST", RouteStatus::InvalidRequest),
            ("OVER_QUERY_LIMIT", RouteStatus::OverQueryLimit),
            ("REQUEST_DENIED", RouteStatus::RequestDenied),
            ("UNKNOWN_ERROR", RouteStatus::ServerError),
            ("SOMETHING_NEW", RouteStatus::Unknown),
        ];
        let mut messages = std::collections::HashSet::new();
        for (code, status) in codes {
            assert_eq!(RouteStatus::from_code(code), status);
            assert!(messages.insert(status.message()), "duplicate message for {code}");
        }
    }

    #[test]
    fn test_zero_results_message() {
        assert_eq!(
            RouteStatus::ZeroResults.message(),
            "No route could be found between the origin and destination"
        );
    }

    #[test]
    fn test_empty_response_is_zero_results() {
        let result = RouteResult::from_response(DirectionsResponse::default());
        assert_eq!(result, Err(RouteStatus::ZeroResults));

        let mut legless = sample_route(&[LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]);
        legless.legs.clear();
        let result = RouteResult::from_response(DirectionsResponse {
            routes: vec![legless],
        });
        assert_eq!(result, Err(RouteStatus::ZeroResults));
    }

    #[test]
    fn test_primary_leg_text() {
        let stops = [
            LatLng::new(37.7749, -122.4194),
            LatLng::new(37.7955, -122.3937),
            LatLng::new(37.7694, -122.4862),
        ];
        let result = RouteResult::from_response(DirectionsResponse {
            routes: vec![sample_route(&stops)],
        })
        .unwrap();

        assert_eq!(result.primary().legs.len(), 2);
        assert!(!result.distance_text().is_empty());
        assert!(!result.duration_text().is_empty());
        assert_eq!(result.primary().via_locations().count(), 1);
        assert_eq!(result.primary().start_location(), Some(stops[0]));
        assert_eq!(result.primary().end_location(), Some(stops[2]));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_routes() {
        let err = serde_json::from_str::<RouteResult>(r#"{"routes":[]}"#).unwrap_err();
        assert!(err.to_string().contains(RouteStatus::ZeroResults.message()));

        let stops = [LatLng::new(37.7749, -122.4194), LatLng::new(37.7955, -122.3937)];
        let mut legless = sample_route(&stops);
        legless.legs.clear();
        let json = serde_json::to_string(&serde_json::json!({
            "routes": [legless, sample_route(&stops)]
        }))
        .unwrap();
        let result: RouteResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.routes().len(), 1);
        assert!(!result.distance_text().is_empty());
    }
}
