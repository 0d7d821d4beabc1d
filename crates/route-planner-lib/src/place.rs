//! User-chosen places (origin, destination, waypoints)

use crate::LatLng;

/// Identifier used for the current-location shortcut
pub const CURRENT_LOCATION_ID: &str = "current_location";

/// A location picked by the user
///
/// Only selections carrying a coordinate can take part in a route. Free-text entries
/// that were never matched against a geocoder are kept unresolved so the search form
/// can still display them.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceSelection {
    pub location: Option<LatLng>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
}

impl PlaceSelection {
    /// A place returned by an autocomplete or geocoding provider
    pub fn resolved(
        location: LatLng,
        name: impl Into<String>,
        formatted_address: impl Into<String>,
        place_id: impl Into<String>,
    ) -> Self {
        Self {
            location: Some(location),
            name: Some(name.into()),
            formatted_address: Some(formatted_address.into()),
            place_id: Some(place_id.into()),
        }
    }

    /// A place built from coordinates typed as `"lat,lng"`
    pub fn from_coordinates(location: LatLng, raw: &str) -> Self {
        Self {
            location: Some(location),
            name: Some("Selected Location".to_string()),
            formatted_address: Some(raw.trim().to_string()),
            place_id: Some(format!("custom_{}_{}", location.lat, location.lng)),
        }
    }

    /// The device's current position offered as an origin
    pub fn current_location(location: LatLng, address: impl Into<String>) -> Self {
        Self {
            location: Some(location),
            name: Some("Current Location".to_string()),
            formatted_address: Some(address.into()),
            place_id: Some(CURRENT_LOCATION_ID.to_string()),
        }
    }

    /// Free text with no coordinate attached
    pub fn unresolved(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            location: None,
            name: Some(text.clone()),
            formatted_address: Some(text),
            place_id: None,
        }
    }

    /// The coordinate of this place, if it has one
    pub fn location(&self) -> Option<LatLng> {
        self.location.filter(LatLng::is_valid)
    }

    pub fn is_resolvable(&self) -> bool {
        self.location().is_some()
    }

    pub fn is_current_location(&self) -> bool {
        self.place_id.as_deref() == Some(CURRENT_LOCATION_ID)
    }

    /// Best text to show for this place
    pub fn label(&self) -> String {
        self.formatted_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref())
            .map(str::to_string)
            .or_else(|| self.location.map(|l| l.to_string()))
            .unwrap_or_default()
    }

    /// Short title for a map pin
    pub fn title(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.formatted_address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_place() {
        let place = PlaceSelection::from_coordinates(LatLng::new(37.7749, -122.4194), "37.7749,-122.4194");
        assert_eq!(place.location(), Some(LatLng::new(37.7749, -122.4194)));
        assert_eq!(place.place_id.as_deref(), Some("custom_37.7749_-122.4194"));
        assert_eq!(place.name.as_deref(), Some("Selected Location"));
    }

    #[test]
    fn test_unresolved_place_has_no_location() {
        let place = PlaceSelection::unresolved("Golden Gate Park");
        assert!(!place.is_resolvable());
        assert_eq!(place.label(), "Golden Gate Park");
    }

    #[test]
    fn test_invalid_coordinate_is_not_resolvable() {
        let place = PlaceSelection {
            location: Some(LatLng::new(f64::NAN, 0.0)),
            ..Default::default()
        };
        assert!(place.location().is_none());
    }

    #[test]
    fn test_current_location() {
        let place = PlaceSelection::current_location(LatLng::new(1.0, 2.0), "1 Main St");
        assert!(place.is_current_location());
        assert_eq!(place.label(), "1 Main St");
    }
}
