use crate::entrypoints::cli::parse_args;
use clap::Parser;
use route_planner_lib::LatLng;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Route Planner - Plan driving routes with waypoints on an OpenStreetMap view
pub struct Settings {
    /// Initial origin: a place name or "lat,lng"
    #[clap(long, value_name = "PLACE")]
    pub origin: Option<String>,

    /// Initial destination: a place name or "lat,lng"
    #[clap(long, value_name = "PLACE")]
    pub destination: Option<String>,

    /// Fixed device position as "lat,lng", used instead of browser geolocation
    #[clap(long, value_name = "LAT,LNG", value_parser = parse_lat_lng)]
    pub location: Option<LatLng>,

    /// Base URL of the OSRM routing server
    #[clap(long, default_value = "https://router.project-osrm.org")]
    pub osrm_url: String,

    /// Base URL of the Nominatim geocoding server
    #[clap(long, default_value = "https://nominatim.openstreetmap.org")]
    pub nominatim_url: String,

    /// Zoom level used when centering on the device position
    #[clap(long, default_value = "14.0")]
    pub zoom: f64,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

fn parse_lat_lng(text: &str) -> Result<LatLng, String> {
    LatLng::parse(text).ok_or_else(|| format!("\"{text}\" is not a valid \"lat,lng\" pair"))
}

impl Settings {
    /// Parse the startup settings, falling back to defaults on the web
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{e}\n\nChange the GET params, using the cli prefix.\nStarting anyway without args."
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    Settings::parse_from(Vec::<String>::new())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["route-planner"]).unwrap();
        assert!(settings.origin.is_none());
        assert!(settings.location.is_none());
        assert_eq!(settings.zoom, 14.0);
        assert_eq!(settings.osrm_url, "https://router.project-osrm.org");
        assert!(!settings.ignore_persisted);
    }

    #[test]
    fn test_location_flag() {
        let settings = Settings::try_parse_from([
            "route-planner",
            "--location",
            "37.7749,-122.4194",
            "--destination",
            "Golden Gate Park",
            "--ignore-persisted",
        ])
        .unwrap();
        assert_eq!(settings.location, Some(LatLng::new(37.7749, -122.4194)));
        assert_eq!(settings.destination.as_deref(), Some("Golden Gate Park"));
        assert!(settings.ignore_persisted);

        assert!(Settings::try_parse_from(["route-planner", "--location", "north"]).is_err());
    }
}
