//! Search/Selection input validation
//!
//! Each field holds the text the user typed and, once an autocomplete suggestion was
//! picked, the committed [`PlaceSelection`]. Typing again discards the commitment. Text
//! in `lat,lng` form counts as a usable coordinate without any geocoding.

use crate::{Endpoint, LatLng, PlaceSelection, SelectionError};

/// Which input a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionField {
    Origin,
    Destination,
    Waypoint,
}

/// One search input
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaceField {
    pub text: String,
    pub selected: Option<PlaceSelection>,
}

impl PlaceField {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selected: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.selected.is_none()
    }

    fn commit(&mut self, selection: PlaceSelection) {
        self.text = selection.label();
        self.selected = Some(selection);
    }

    fn edit(&mut self, text: String) {
        self.text = text;
        self.selected = None;
    }

    /// Coordinate typed directly into the field
    pub fn typed_coordinate(&self) -> Option<LatLng> {
        LatLng::parse(&self.text)
    }

    /// The place this field stands for: the committed selection if it has a coordinate,
    /// otherwise typed coordinates
    pub fn resolve(&self) -> Option<PlaceSelection> {
        if let Some(selected) = self.selected.as_ref().filter(|s| s.is_resolvable()) {
            return Some(selected.clone());
        }
        self.typed_coordinate()
            .map(|location| PlaceSelection::from_coordinates(location, &self.text))
    }
}

/// A validated origin/destination pair, ready for routing
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSelection {
    /// Literal coordinate for typed coordinates and the current location
    pub origin: Endpoint,
    pub destination: PlaceSelection,
}

/// The origin/destination/waypoint inputs of the planner
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    origin: PlaceField,
    destination: PlaceField,
    waypoint: PlaceField,
    /// An origin was supplied at startup; the current location must not override it
    initial_origin: bool,
    current_location: Option<PlaceSelection>,
    error: Option<SelectionError>,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled with startup text, e.g. from the command line
    pub fn with_initial(origin: Option<&str>, destination: Option<&str>) -> Self {
        let origin = origin.map(str::trim).filter(|s| !s.is_empty());
        let destination = destination.map(str::trim).filter(|s| !s.is_empty());
        Self {
            origin: PlaceField::with_text(origin.unwrap_or_default()),
            destination: PlaceField::with_text(destination.unwrap_or_default()),
            initial_origin: origin.is_some(),
            ..Default::default()
        }
    }

    pub fn origin(&self) -> &PlaceField {
        &self.origin
    }

    pub fn destination(&self) -> &PlaceField {
        &self.destination
    }

    pub fn waypoint(&self) -> &PlaceField {
        &self.waypoint
    }

    /// The last validation failure, cleared by the next edit or successful submit
    pub fn error(&self) -> Option<SelectionError> {
        self.error
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn field_mut(&mut self, field: SelectionField) -> &mut PlaceField {
        match field {
            SelectionField::Origin => &mut self.origin,
            SelectionField::Destination => &mut self.destination,
            SelectionField::Waypoint => &mut self.waypoint,
        }
    }

    fn reject(&mut self, field: SelectionField) -> SelectionError {
        let err = SelectionError::Unresolved { field };
        self.error = Some(err);
        err
    }

    /// Accept an autocomplete pick for `field`
    ///
    /// A pick without a coordinate only fills in the text and records a validation
    /// error.
    pub fn commit(
        &mut self,
        field: SelectionField,
        selection: PlaceSelection,
    ) -> Result<(), SelectionError> {
        if !selection.is_resolvable() {
            self.field_mut(field).edit(selection.label());
            return Err(self.reject(field));
        }
        self.field_mut(field).commit(selection);
        self.error = None;
        Ok(())
    }

    pub fn commit_origin(&mut self, selection: PlaceSelection) -> Result<(), SelectionError> {
        self.commit(SelectionField::Origin, selection)
    }

    pub fn commit_destination(&mut self, selection: PlaceSelection) -> Result<(), SelectionError> {
        self.commit(SelectionField::Destination, selection)
    }

    /// Replace the text of `field`, dropping its committed selection
    pub fn edit(&mut self, field: SelectionField, text: impl Into<String>) {
        self.field_mut(field).edit(text.into());
        self.error = None;
    }

    pub fn edit_origin(&mut self, text: impl Into<String>) {
        self.edit(SelectionField::Origin, text);
    }

    pub fn edit_destination(&mut self, text: impl Into<String>) {
        self.edit(SelectionField::Destination, text);
    }

    pub fn edit_waypoint(&mut self, text: impl Into<String>) {
        self.edit(SelectionField::Waypoint, text);
    }

    /// Take the waypoint input as a new stop and empty the field
    pub fn take_waypoint(&mut self) -> Result<PlaceSelection, SelectionError> {
        let Some(selection) = self.waypoint.resolve() else {
            return Err(self.reject(SelectionField::Waypoint));
        };
        self.waypoint = PlaceField::default();
        self.error = None;
        Ok(selection)
    }

    /// Commit an autocomplete pick straight as a new stop
    pub fn commit_waypoint(&mut self, selection: PlaceSelection) -> Result<PlaceSelection, SelectionError> {
        self.commit(SelectionField::Waypoint, selection)?;
        self.take_waypoint()
    }

    pub fn current_location(&self) -> Option<&PlaceSelection> {
        self.current_location.as_ref()
    }

    /// Update the current-location shortcut
    ///
    /// It becomes the origin when the origin is still empty and no origin was given at
    /// startup. An origin that already is the current location follows it.
    pub fn set_current_location(&mut self, location: LatLng, address: &str) {
        let selection = PlaceSelection::current_location(location, address);
        let follows = self
            .origin
            .selected
            .as_ref()
            .is_some_and(PlaceSelection::is_current_location);
        if follows || (self.origin.is_empty() && !self.initial_origin) {
            self.origin.commit(selection.clone());
        }
        self.current_location = Some(selection);
    }

    /// Use the current location as origin; `false` when no position is known yet
    pub fn use_current_location(&mut self) -> bool {
        match self.current_location.clone() {
            Some(selection) => {
                self.origin.commit(selection);
                self.error = None;
                true
            }
            None => false,
        }
    }

    /// Forget everything typed or picked, keeping the current-location shortcut
    pub fn reset(&mut self) {
        *self = Self {
            current_location: self.current_location.take(),
            ..Self::default()
        };
    }

    /// Validate origin and destination for the directions action
    pub fn submit(&mut self) -> Result<RouteSelection, SelectionError> {
        let Some(origin) = self.origin.resolve() else {
            return Err(self.reject(SelectionField::Origin));
        };
        let Some(destination) = self.destination.resolve() else {
            return Err(self.reject(SelectionField::Destination));
        };
        self.error = None;

        let origin = match origin.location() {
            Some(location) if origin.is_current_location() || self.origin.typed_coordinate().is_some() => {
                Endpoint::Coordinate(location)
            }
            _ => Endpoint::Place(origin),
        };
        Ok(RouteSelection {
            origin,
            destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARK: LatLng = LatLng::new(37.7694, -122.4862);

    fn park() -> PlaceSelection {
        PlaceSelection::resolved(PARK, "Golden Gate Park", "Golden Gate Park, San Francisco", "gg_park")
    }

    #[test]
    fn test_raw_coordinates_and_autocomplete() {
        let mut form = SearchForm::new();
        form.edit_origin("37.7749,-122.4194");
        form.commit_destination(park()).unwrap();

        let selection = form.submit().unwrap();
        assert_eq!(
            selection.origin,
            Endpoint::Coordinate(LatLng::new(37.7749, -122.4194))
        );
        assert_eq!(selection.destination.location(), Some(PARK));
        assert!(form.error().is_none());
    }

    #[test]
    fn test_unresolved_text_is_rejected() {
        let mut form = SearchForm::new();
        form.edit_origin("37.7749,-122.4194");
        form.edit_destination("Golden Gate Park");

        let err = form.submit().unwrap_err();
        assert_eq!(
            err,
            SelectionError::Unresolved {
                field: SelectionField::Destination
            }
        );
        assert_eq!(err.to_string(), "Please select a valid location from the dropdown");
        assert_eq!(form.error(), Some(err));

        form.edit_destination("Golden");
        assert!(form.error().is_none());
    }

    #[test]
    fn test_editing_discards_selection() {
        let mut form = SearchForm::new();
        form.commit_destination(park()).unwrap();
        assert!(form.destination().selected.is_some());

        form.edit_destination("Golden Gate Par");
        assert!(form.destination().selected.is_none());
        assert!(form.destination().resolve().is_none());
    }

    #[test]
    fn test_commit_without_coordinate() {
        let mut form = SearchForm::new();
        let err = form
            .commit_destination(PlaceSelection::unresolved("Atlantis"))
            .unwrap_err();
        assert_eq!(
            err,
            SelectionError::Unresolved {
                field: SelectionField::Destination
            }
        );
        assert_eq!(form.destination().text, "Atlantis");

        let err = form
            .commit_origin(PlaceSelection::unresolved("Lemuria"))
            .unwrap_err();
        assert_eq!(
            err,
            SelectionError::Unresolved {
                field: SelectionField::Origin
            }
        );
        assert_eq!(form.origin().text, "Lemuria");
    }

    #[test]
    fn test_current_location_default_origin() {
        let mut form = SearchForm::new();
        form.commit_destination(park()).unwrap();
        form.set_current_location(LatLng::new(37.78, -122.41), "Market St");

        let selection = form.submit().unwrap();
        assert_eq!(selection.origin, Endpoint::Coordinate(LatLng::new(37.78, -122.41)));

        // Follows the device while it is the origin
        form.set_current_location(LatLng::new(37.79, -122.40), "Pine St");
        let selection = form.submit().unwrap();
        assert_eq!(selection.origin, Endpoint::Coordinate(LatLng::new(37.79, -122.40)));
    }

    #[test]
    fn test_initial_origin_is_kept() {
        let mut form = SearchForm::with_initial(Some("37.7749,-122.4194"), Some("37.7694,-122.4862"));
        form.set_current_location(LatLng::new(1.0, 1.0), "");
        assert_eq!(form.origin().text, "37.7749,-122.4194");

        let selection = form.submit().unwrap();
        assert_eq!(
            selection.origin,
            Endpoint::Coordinate(LatLng::new(37.7749, -122.4194))
        );
        assert_eq!(selection.destination.name.as_deref(), Some("Selected Location"));

        assert!(form.use_current_location());
        assert!(form.origin().selected.as_ref().unwrap().is_current_location());
    }

    #[test]
    fn test_autocomplete_origin_is_place() {
        let mut form = SearchForm::new();
        form.commit_origin(park()).unwrap();
        form.edit_destination("37.7955,-122.3937");
        let selection = form.submit().unwrap();
        assert_eq!(selection.origin, Endpoint::Place(park()));
    }

    #[test]
    fn test_waypoint_input() {
        let mut form = SearchForm::new();
        form.edit_waypoint("Ferry");
        assert!(form.take_waypoint().is_err());

        form.edit_waypoint("37.7955,-122.3937");
        let waypoint = form.take_waypoint().unwrap();
        assert_eq!(waypoint.location(), Some(LatLng::new(37.7955, -122.3937)));
        assert!(form.waypoint().is_empty());

        let picked = form.commit_waypoint(park()).unwrap();
        assert_eq!(picked, park());
        assert!(form.waypoint().is_empty());
    }
}
