//! OSRM routing backend
//!
//! Requests without intermediate stops use the `route` service and may return
//! alternatives. With stops and waypoint optimization the `trip` service is used with a
//! fixed start and end, which lets OSRM reorder only the stops in between.

use route_planner_lib::provider::{BoxFuture, DirectionsService};
use route_planner_lib::{
    Bounds, DirectionsResponse, Distance, LatLng, Route, RouteLeg, RouteRequest, RouteStatus,
    TravelTime,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    trips: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// `[longitude, latitude]` pairs
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    /// Snapped `[longitude, latitude]`
    location: [f64; 2],
    #[serde(default)]
    name: String,
    /// Position of this input coordinate in the trip (trip service only)
    #[serde(default)]
    waypoint_index: Option<usize>,
}

impl OsrmWaypoint {
    fn coords(&self) -> LatLng {
        LatLng::new(self.location[1], self.location[0])
    }

    fn address(&self) -> String {
        if self.name.is_empty() {
            self.coords().to_string()
        } else {
            self.name.clone()
        }
    }
}

/// Map an OSRM response code onto the routing status taxonomy
pub fn status_for_code(code: &str) -> RouteStatus {
    match code {
        "NoRoute" | "NoTrips" => RouteStatus::ZeroResults,
        "NoSegment" | "NoMatch" => RouteStatus::NotFound,
        "TooBig" => RouteStatus::MaxWaypointsExceeded,
        "InvalidUrl" | "InvalidService" | "InvalidVersion" | "InvalidOptions" | "InvalidQuery"
        | "InvalidValue" | "NotImplemented" => RouteStatus::InvalidRequest,
        _ => RouteStatus::Unknown,
    }
}

/// Map an HTTP status without a usable OSRM body
pub fn status_for_http(status: u16) -> RouteStatus {
    match status {
        429 => RouteStatus::OverQueryLimit,
        401 | 403 => RouteStatus::RequestDenied,
        400 => RouteStatus::InvalidRequest,
        500..=599 => RouteStatus::ServerError,
        _ => RouteStatus::Unknown,
    }
}

/// Whether `request` goes to the trip service
fn uses_trip(request: &RouteRequest) -> bool {
    request.optimize_waypoints && !request.waypoints.is_empty()
}

/// Input coordinates in request order: origin, stops, destination
fn request_coordinates(request: &RouteRequest) -> Vec<LatLng> {
    let mut coords = Vec::with_capacity(request.waypoints.len() + 2);
    coords.push(request.origin);
    coords.extend(request.waypoints.iter().map(|w| w.location));
    coords.push(request.destination);
    coords
}

/// Convert an OSRM answer
///
/// `status` is the HTTP status code, consulted only when the body is not an OSRM
/// response.
pub fn parse_response(
    body: &str,
    status: u16,
    request: &RouteRequest,
) -> Result<DirectionsResponse, RouteStatus> {
    let response: OsrmResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!("Unreadable OSRM response (HTTP {status}): {err}");
            return Err(if (200..300).contains(&status) {
                RouteStatus::Unknown
            } else {
                status_for_http(status)
            });
        }
    };

    if response.code != "Ok" {
        tracing::warn!(
            "OSRM answered {}: {}",
            response.code,
            response.message.as_deref().unwrap_or_default()
        );
        return Err(status_for_code(&response.code));
    }

    let trip = uses_trip(request);
    // Input indices in visit order
    let visit_order: Vec<usize> = if trip {
        let mut order: Vec<usize> = (0..response.waypoints.len()).collect();
        order.sort_by_key(|&i| response.waypoints[i].waypoint_index.unwrap_or(i));
        order
    } else {
        (0..response.waypoints.len()).collect()
    };
    let stops: Vec<&OsrmWaypoint> = visit_order.iter().map(|&i| &response.waypoints[i]).collect();

    // Stops between origin and destination, as indices into the request's waypoint list
    let waypoint_order: Vec<usize> = visit_order
        .iter()
        .filter(|&&i| i > 0 && i <= request.waypoints.len())
        .map(|&i| i - 1)
        .collect();

    let fallback = request_coordinates(request);
    let raw_routes = if trip { response.trips } else { response.routes };
    let routes = raw_routes
        .into_iter()
        .map(|route| convert_route(route, &stops, &fallback, &waypoint_order))
        .collect();

    Ok(DirectionsResponse { routes })
}

fn convert_route(
    route: OsrmRoute,
    stops: &[&OsrmWaypoint],
    fallback: &[LatLng],
    waypoint_order: &[usize],
) -> Route {
    let stop_at = |i: usize| -> (LatLng, String) {
        match stops.get(i) {
            Some(stop) => (stop.coords(), stop.address()),
            None => {
                let coords = fallback.get(i).copied().unwrap_or(LatLng::new(0.0, 0.0));
                (coords, coords.to_string())
            }
        }
    };

    let summary = route
        .legs
        .iter()
        .map(|leg| leg.summary.as_str())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let legs: Vec<RouteLeg> = route
        .legs
        .iter()
        .enumerate()
        .map(|(i, leg)| {
            let (start_location, start_address) = stop_at(i);
            let (end_location, end_address) = stop_at(i + 1);
            RouteLeg {
                start_address,
                end_address,
                start_location,
                end_location,
                distance: Distance::from_meters(leg.distance),
                duration: TravelTime::from_seconds(leg.duration),
            }
        })
        .collect();

    let path: Vec<LatLng> = route
        .geometry
        .coordinates
        .iter()
        .map(|c| LatLng::new(c[1], c[0]))
        .collect();

    let bounds = Bounds::from_points(&path)
        .or_else(|| Bounds::from_points(fallback))
        .unwrap_or_else(|| Bounds::new(LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.0)));

    Route {
        summary,
        legs,
        path,
        bounds,
        waypoint_order: waypoint_order.to_vec(),
    }
}

/// Directions from an OSRM server
pub struct OsrmDirections {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmDirections {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: super::http_client(),
            base_url: super::normalize_base_url(base_url),
        }
    }

    /// Full request URL for `request`
    pub fn request_url(&self, request: &RouteRequest) -> String {
        let coords = request_coordinates(request)
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.lng, c.lat))
            .collect::<Vec<_>>()
            .join(";");

        if uses_trip(request) {
            format!(
                "{}/trip/v1/driving/{coords}?source=first&destination=last&roundtrip=false&overview=full&geometries=geojson",
                self.base_url
            )
        } else {
            let alternatives = request.waypoints.is_empty();
            format!(
                "{}/route/v1/driving/{coords}?overview=full&geometries=geojson&alternatives={alternatives}",
                self.base_url
            )
        }
    }
}

impl DirectionsService for OsrmDirections {
    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<DirectionsResponse, RouteStatus>> {
        Box::pin(async move {
            let url = self.request_url(&request);
            tracing::debug!("OSRM request: {url}");

            let response = self.client.get(&url).send().await.map_err(|err| {
                tracing::warn!("OSRM request failed: {err}");
                RouteStatus::ServerError
            })?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|err| {
                tracing::warn!("Failed to read OSRM response: {err}");
                RouteStatus::ServerError
            })?;

            parse_response(&body, status, &request)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_planner_lib::{RouteResult, RouteWaypoint, TravelMode};

    fn request(waypoints: &[LatLng]) -> RouteRequest {
        RouteRequest {
            origin: LatLng::new(37.7749, -122.4194),
            destination: LatLng::new(37.7694, -122.4862),
            waypoints: waypoints
                .iter()
                .map(|&location| RouteWaypoint {
                    location,
                    stopover: true,
                })
                .collect(),
            optimize_waypoints: true,
            travel_mode: TravelMode::Driving,
        }
    }

    #[test]
    fn test_request_url() {
        let osrm = OsrmDirections::new("https://router.example.org/");
        let url = osrm.request_url(&request(&[]));
        assert_eq!(
            url,
            "https://router.example.org/route/v1/driving/-122.419400,37.774900;-122.486200,37.769400?overview=full&geometries=geojson&alternatives=true"
        );

        let url = osrm.request_url(&request(&[LatLng::new(37.7955, -122.3937)]));
        assert!(url.starts_with("https://router.example.org/trip/v1/driving/"));
        assert!(url.contains("source=first&destination=last&roundtrip=false"));
    }

    #[test]
    fn test_parse_route() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 9500.2,
                "duration": 1260.0,
                "geometry": {"type": "LineString", "coordinates": [[-122.4194, 37.7749], [-122.45, 37.772], [-122.4862, 37.7694]]},
                "legs": [{"distance": 9500.2, "duration": 1260.0, "summary": "Fell Street"}]
            }],
            "waypoints": [
                {"location": [-122.41941, 37.77489], "name": "Market Street"},
                {"location": [-122.48618, 37.76941], "name": ""}
            ]
        }"#;
        let response = parse_response(body, 200, &request(&[])).unwrap();
        let result = RouteResult::from_response(response).unwrap();

        let leg = result.primary_leg();
        assert_eq!(leg.start_address, "Market Street");
        assert_eq!(leg.start_location, LatLng::new(37.77489, -122.41941));
        assert_eq!(leg.end_address, LatLng::new(37.76941, -122.48618).to_string());
        assert_eq!(result.distance_text(), "9.5 km");
        assert_eq!(result.duration_text(), "21 mins");
        assert_eq!(result.primary().summary, "Fell Street");
        assert_eq!(result.primary().path.len(), 3);
    }

    #[test]
    fn test_parse_trip_reorders_stops() {
        let b = LatLng::new(37.80, -122.41);
        let c = LatLng::new(37.79, -122.39);
        // Input order origin, B, C, destination; OSRM visits C before B
        let body = r#"{
            "code": "Ok",
            "trips": [{
                "distance": 12000.0,
                "duration": 1500.0,
                "geometry": {"coordinates": [[-122.4194, 37.7749], [-122.39, 37.79], [-122.41, 37.80], [-122.4862, 37.7694]]},
                "legs": [
                    {"distance": 3000.0, "duration": 400.0},
                    {"distance": 2000.0, "duration": 300.0},
                    {"distance": 7000.0, "duration": 800.0}
                ]
            }],
            "waypoints": [
                {"location": [-122.4194, 37.7749], "name": "Origin St", "waypoint_index": 0, "trips_index": 0},
                {"location": [-122.41, 37.80], "name": "B St", "waypoint_index": 2, "trips_index": 0},
                {"location": [-122.39, 37.79], "name": "C St", "waypoint_index": 1, "trips_index": 0},
                {"location": [-122.4862, 37.7694], "name": "Park Dr", "waypoint_index": 3, "trips_index": 0}
            ]
        }"#;
        let response = parse_response(body, 200, &request(&[b, c])).unwrap();
        let route = &response.routes[0];

        assert_eq!(route.waypoint_order, [1, 0]);
        let via: Vec<_> = route.via_locations().map(|leg| leg.end_address.as_str()).collect();
        assert_eq!(via, ["C St", "B St"]);
        assert_eq!(route.legs[2].end_address, "Park Dr");
    }

    #[test]
    fn test_error_codes() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        assert_eq!(
            parse_response(body, 400, &request(&[])),
            Err(RouteStatus::ZeroResults)
        );

        let body = r#"{"code": "NoSegment", "message": "Could not find a matching segment"}"#;
        assert_eq!(parse_response(body, 400, &request(&[])), Err(RouteStatus::NotFound));

        assert_eq!(
            parse_response("Too Many Requests", 429, &request(&[])),
            Err(RouteStatus::OverQueryLimit)
        );
        assert_eq!(
            parse_response("<html>Bad Gateway</html>", 502, &request(&[])),
            Err(RouteStatus::ServerError)
        );
        assert_eq!(status_for_code("TooBig"), RouteStatus::MaxWaypointsExceeded);
        assert_eq!(status_for_http(403), RouteStatus::RequestDenied);
    }
}
