//! Coordinate types and spatial helpers

use geo::{Coord, Rect};

/// Earth's mean radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and inside the valid degree ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Parse a raw `"lat,lng"` string as typed by a user
    ///
    /// Whitespace around either component is ignored. Returns `None` unless both parts
    /// parse and lie within the valid ranges.
    pub fn parse(text: &str) -> Option<Self> {
        let (lat, lng) = text.split_once(',')?;
        let lat = lat.trim().parse::<f64>().ok()?;
        let lng = lng.trim().parse::<f64>().ok()?;
        let coord = Self::new(lat, lng);
        coord.is_valid().then_some(coord)
    }

    /// Great-circle distance to another coordinate in meters (Haversine)
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(value: LatLng) -> Self {
        Coord {
            x: value.lng,
            y: value.lat,
        }
    }
}

/// A device position: coordinate plus optional accuracy radius in meters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub coords: LatLng,
    pub accuracy: Option<f64>,
}

impl Position {
    pub const fn new(coords: LatLng, accuracy: Option<f64>) -> Self {
        Self { coords, accuracy }
    }
}

/// Geographic bounding box (x = longitude, y = latitude)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds(Rect<f64>);

impl Bounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self(Rect::new(Coord::from(south_west), Coord::from(north_east)))
    }

    /// Smallest box containing every coordinate, `None` for an empty input
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (mut min, mut max) = (first, first);
        for point in iter {
            min.lat = min.lat.min(point.lat);
            min.lng = min.lng.min(point.lng);
            max.lat = max.lat.max(point.lat);
            max.lng = max.lng.max(point.lng);
        }
        Some(Self::new(min, max))
    }

    /// Grow the box so it also contains `other`
    pub fn union(&self, other: &Bounds) -> Self {
        Self::new(
            LatLng::new(
                self.south_west().lat.min(other.south_west().lat),
                self.south_west().lng.min(other.south_west().lng),
            ),
            LatLng::new(
                self.north_east().lat.max(other.north_east().lat),
                self.north_east().lng.max(other.north_east().lng),
            ),
        )
    }

    pub fn south_west(&self) -> LatLng {
        let min = self.0.min();
        LatLng::new(min.y, min.x)
    }

    pub fn north_east(&self) -> LatLng {
        let max = self.0.max();
        LatLng::new(max.y, max.x)
    }

    pub fn center(&self) -> LatLng {
        let center = self.0.center();
        LatLng::new(center.y, center.x)
    }

    /// Largest of the latitude and longitude spans, in degrees
    pub fn max_span(&self) -> f64 {
        self.0.width().max(self.0.height())
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        let (sw, ne) = (self.south_west(), self.north_east());
        (sw.lat..=ne.lat).contains(&point.lat) && (sw.lng..=ne.lng).contains(&point.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_coordinates() {
        let coord = LatLng::parse("37.7749,-122.4194").unwrap();
        assert_eq!(coord, LatLng::new(37.7749, -122.4194));

        let spaced = LatLng::parse("  37.7749 ,  -122.4194 ").unwrap();
        assert_eq!(spaced, coord);
    }

    #[test]
    fn test_parse_rejects_garbage_and_out_of_range() {
        assert!(LatLng::parse("Golden Gate Park").is_none());
        assert!(LatLng::parse("37.7749").is_none());
        assert!(LatLng::parse("abc,def").is_none());
        assert!(LatLng::parse("91.0,0.0").is_none());
        assert!(LatLng::parse("0.0,181.0").is_none());
        assert!(LatLng::parse("NaN,0.0").is_none());
    }

    #[test]
    fn test_distance_known_value() {
        // Ferry Building to Golden Gate Park, roughly 8.6 km
        let ferry = LatLng::new(37.7955, -122.3937);
        let park = LatLng::new(37.7694, -122.4862);
        let distance = ferry.distance_to(&park);
        assert!(distance > 8_000.0 && distance < 9_500.0);
        assert!(ferry.distance_to(&ferry).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [
            LatLng::new(37.7749, -122.4194),
            LatLng::new(37.7955, -122.3937),
            LatLng::new(37.7694, -122.4862),
        ];
        let bounds = Bounds::from_points(&points).unwrap();
        assert_eq!(bounds.south_west(), LatLng::new(37.7694, -122.4862));
        assert_eq!(bounds.north_east(), LatLng::new(37.7955, -122.3937));
        assert!(points.iter().all(|p| bounds.contains(p)));
        assert!(Bounds::from_points(&Vec::<LatLng>::new()).is_none());
    }

    #[test]
    fn test_bounds_union_and_center() {
        let a = Bounds::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0));
        let b = Bounds::new(LatLng::new(-1.0, 2.0), LatLng::new(0.5, 3.0));
        let merged = a.union(&b);
        assert_eq!(merged.south_west(), LatLng::new(-1.0, 0.0));
        assert_eq!(merged.north_east(), LatLng::new(1.0, 3.0));
        assert_eq!(merged.center(), LatLng::new(0.0, 1.5));
        assert!((merged.max_span() - 3.0).abs() < f64::EPSILON);
    }
}
