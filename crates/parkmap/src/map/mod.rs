//! Map interaction: reference location, nearby markers, highlight and details modal.

pub mod geocode;
pub mod machine;
pub mod session;

pub use geocode::{GeocodeError, GeocodedPlace, Geocoder, HttpGeocoder};
pub use machine::{
    GeolocationError, MapCommand, MapEvent, MapMachine, MapPhase, MapView, ModalState,
    ReferenceLocation, ADDRESS_NOT_FOUND, CLICK_ZOOM, DEFAULT_ZOOM, GEOLOCATION_ZOOM, PLACE_ZOOM,
};
pub use session::MapSession;
