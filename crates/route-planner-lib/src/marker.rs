//! Map pins and their visual styles

use crate::LatLng;

/// Identifier assigned by a map surface to a placed marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// What a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    /// The device position
    UserLocation,
    /// Start of a route
    Origin,
    /// Intermediate stop; zero-based visit index
    Waypoint(usize),
    Destination,
}

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const BLUE: Rgb = Rgb(0x42, 0x85, 0xF4);
    pub const YELLOW: Rgb = Rgb(0xFB, 0xBC, 0x04);
    pub const RED: Rgb = Rgb(0xEA, 0x43, 0x35);
    pub const DARK_RED: Rgb = Rgb(0xB3, 0x14, 0x12);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinShape {
    Pin,
    Circle,
}

/// Visual description of a marker, independent of the rendering backend
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub shape: PinShape,
    pub background: Rgb,
    pub border: Rgb,
    pub glyph_color: Rgb,
    /// Text drawn inside the pin (waypoint number)
    pub glyph: Option<String>,
    pub scale: f32,
}

impl MarkerStyle {
    /// Plain pin as drawn by the map provider when nothing custom is requested
    pub fn provider_default() -> Self {
        Self {
            shape: PinShape::Pin,
            background: Rgb::RED,
            border: Rgb::DARK_RED,
            glyph_color: Rgb::DARK_RED,
            glyph: None,
            scale: 1.0,
        }
    }

    /// Blue pin for a route start
    pub fn origin() -> Self {
        Self {
            shape: PinShape::Pin,
            background: Rgb::BLUE,
            border: Rgb::WHITE,
            glyph_color: Rgb::WHITE,
            glyph: None,
            scale: 1.2,
        }
    }

    /// Yellow pin labelled with the one-based stop number
    pub fn waypoint(index: usize) -> Self {
        Self {
            shape: PinShape::Pin,
            background: Rgb::YELLOW,
            border: Rgb::BLUE,
            glyph_color: Rgb::BLACK,
            glyph: Some((index + 1).to_string()),
            scale: 1.2,
        }
    }

    /// Red pin for the destination
    pub fn destination() -> Self {
        Self {
            shape: PinShape::Pin,
            background: Rgb::RED,
            border: Rgb::WHITE,
            glyph_color: Rgb::WHITE,
            glyph: None,
            scale: 1.2,
        }
    }

    /// Blue dot with a white ring for the device position
    pub fn user_location() -> Self {
        Self {
            shape: PinShape::Circle,
            background: Rgb::BLUE,
            border: Rgb::WHITE,
            glyph_color: Rgb::WHITE,
            glyph: None,
            scale: 1.0,
        }
    }
}

/// Caller-facing marker parameters
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub title: Option<String>,
    /// Use the styled origin pin instead of the provider default
    pub custom_pin: bool,
}

impl MarkerOptions {
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            title: None,
            custom_pin: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_custom_pin(mut self, custom_pin: bool) -> Self {
        self.custom_pin = custom_pin;
        self
    }
}

/// Everything a map surface needs to draw one marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub title: Option<String>,
    pub role: MarkerRole,
    pub style: MarkerStyle,
}

/// A marker placed on the map and tracked by the map service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerHandle {
    pub id: MarkerId,
    pub role: MarkerRole,
    pub position: LatLng,
}
