//! Sharing the device position as a link

use route_planner_lib::LatLng;
use std::time::Duration;

/// How long the "Copied!" confirmation stays visible
pub const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

/// OpenStreetMap link with a marker at `position`
pub fn location_link(position: LatLng) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat:.6}&mlon={lng:.6}#map=16/{lat:.6}/{lng:.6}",
        lat = position.lat,
        lng = position.lng
    )
}

/// Message shared alongside the link
pub fn share_text(address: &str, link: &str) -> String {
    if address.is_empty() {
        format!("My current location:\n{link}")
    } else {
        format!("My current location: {address}\n{link}")
    }
}

/// WhatsApp "click to chat" link pre-filled with `text`
pub fn whatsapp_link(text: &str) -> Option<String> {
    match reqwest::Url::parse_with_params("https://wa.me/", &[("text", text)]) {
        Ok(url) => Some(url.into()),
        Err(err) => {
            tracing::warn!("Cannot build WhatsApp link: {err}");
            None
        }
    }
}
