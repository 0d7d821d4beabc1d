//! Nominatim geocoding backend

use route_planner_lib::provider::{BoxFuture, Geocoder};
use route_planner_lib::{GeocodeError, LatLng, PlaceSelection};
use serde::Deserialize;

/// Number of autocomplete suggestions requested per search
const SEARCH_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    place_id: serde_json::Value,
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    name: Option<String>,
}

impl SearchResult {
    fn into_place(self) -> Option<PlaceSelection> {
        let location = LatLng::new(self.lat.parse().ok()?, self.lon.parse().ok()?);
        if !location.is_valid() {
            return None;
        }
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| first_component(&self.display_name));
        let place_id = match self.place_id {
            serde_json::Value::String(id) => id,
            other => other.to_string(),
        };
        Some(PlaceSelection::resolved(
            location,
            name,
            self.display_name,
            place_id,
        ))
    }
}

/// First comma-separated part of a display name
fn first_component(display_name: &str) -> String {
    display_name
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Parse a `reverse` answer into a formatted address
pub fn parse_reverse(body: &str) -> Result<String, GeocodeError> {
    let response: ReverseResponse =
        serde_json::from_str(body).map_err(|err| GeocodeError::Provider(err.to_string()))?;
    if let Some(error) = response.error {
        tracing::debug!("Nominatim reverse lookup: {error}");
        return Err(GeocodeError::NoResults);
    }
    response
        .display_name
        .filter(|name| !name.is_empty())
        .ok_or(GeocodeError::NoResults)
}

/// Parse a `search` answer into place selections
pub fn parse_search(body: &str) -> Result<Vec<PlaceSelection>, GeocodeError> {
    let results: Vec<SearchResult> =
        serde_json::from_str(body).map_err(|err| GeocodeError::Provider(err.to_string()))?;
    let places: Vec<PlaceSelection> = results
        .into_iter()
        .filter_map(SearchResult::into_place)
        .collect();
    if places.is_empty() {
        Err(GeocodeError::NoResults)
    } else {
        Ok(places)
    }
}

/// Forward and reverse geocoding against a Nominatim server
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: super::http_client(),
            base_url: super::normalize_base_url(base_url),
        }
    }

    pub fn reverse_url(&self, location: LatLng) -> Result<reqwest::Url, GeocodeError> {
        reqwest::Url::parse_with_params(
            &format!("{}/reverse", self.base_url),
            &[
                ("format", "jsonv2".to_string()),
                ("lat", location.lat.to_string()),
                ("lon", location.lng.to_string()),
            ],
        )
        .map_err(|err| GeocodeError::Provider(err.to_string()))
    }

    pub fn search_url(&self, query: &str) -> Result<reqwest::Url, GeocodeError> {
        reqwest::Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[
                ("format", "jsonv2".to_string()),
                ("q", query.to_string()),
                ("limit", SEARCH_LIMIT.to_string()),
            ],
        )
        .map_err(|err| GeocodeError::Provider(err.to_string()))
    }

    async fn fetch(&self, url: reqwest::Url) -> Result<String, GeocodeError> {
        tracing::debug!("Nominatim request: {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| GeocodeError::Provider(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Provider(format!("HTTP {status}")));
        }
        response
            .text()
            .await
            .map_err(|err| GeocodeError::Provider(err.to_string()))
    }
}

impl Geocoder for NominatimGeocoder {
    fn reverse_geocode(&self, location: LatLng) -> BoxFuture<'_, Result<String, GeocodeError>> {
        Box::pin(async move {
            let url = self.reverse_url(location)?;
            let body = self.fetch(url).await?;
            parse_reverse(&body)
        })
    }

    fn search(&self, query: String) -> BoxFuture<'_, Result<Vec<PlaceSelection>, GeocodeError>> {
        Box::pin(async move {
            let url = self.search_url(&query)?;
            let body = self.fetch(url).await?;
            parse_search(&body)
        })
    }
}
