//! HTTP implementations of the routing and geocoding collaborators

mod nominatim;
mod osrm;

pub use nominatim::NominatimGeocoder;
pub use osrm::OsrmDirections;

/// HTTP client shared by the backends
///
/// Public OSM services ask clients to identify themselves, so native builds send the
/// package name and version. Browsers set their own user agent.
fn http_client() -> reqwest::Client {
    #[cfg(not(target_arch = "wasm32"))]
    {
        reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("Falling back to default HTTP client: {err}");
                reqwest::Client::new()
            })
    }
    #[cfg(target_arch = "wasm32")]
    {
        reqwest::Client::new()
    }
}

/// Strip trailing slashes so paths can be appended with `/`
fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
