use tracing::{debug, warn};

use super::geocode::GeocodeError;
use crate::catalog::{Listing, ListingId};
use crate::geo::{Coordinate, GeoBounds};
use crate::token::{RequestToken, TokenSequence};

pub const DEFAULT_ZOOM: u8 = 12;
pub const GEOLOCATION_ZOOM: u8 = 10;
pub const PLACE_ZOOM: u8 = 15;
pub const CLICK_ZOOM: u8 = 15;

/// Shown when a clicked point cannot be reverse-geocoded.
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

const SAFE_LATITUDE_INSET: f64 = 0.25;
const SAFE_LONGITUDE_INSET: f64 = 0.2;

/// The point nearby listings are measured from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLocation {
    pub coordinate: Coordinate,
    /// `None` while a reverse lookup is still outstanding.
    pub address: Option<String>,
}

impl ReferenceLocation {
    pub fn unresolved(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            address: None,
        }
    }

    pub fn with_address(coordinate: Coordinate, address: impl Into<String>) -> Self {
        Self {
            coordinate,
            address: Some(address.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub marker_position: Option<Coordinate>,
    pub reference: Option<ReferenceLocation>,
    /// Last viewport reported by the renderer.
    pub bounds: Option<GeoBounds>,
    /// Inline message for degraded paths (failed fetch, unresolved search, no geolocation).
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapPhase {
    Idle,
    Located,
    Highlighted { listing_id: ListingId },
    ModalOpen { listing: Listing },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    Unsupported,
    PermissionDenied,
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    GeolocationResolved(Coordinate),
    GeolocationUnavailable(GeolocationError),
    PlaceSelected(ReferenceLocation),
    MapClicked(Coordinate),
    MarkerClicked(ListingId),
    ViewDetails,
    ModalClosed,
    ViewportChanged(GeoBounds),
    NearbyLoaded {
        token: RequestToken,
        listings: Vec<Listing>,
    },
    NearbyFailed {
        token: RequestToken,
        message: String,
    },
    AddressResolved {
        token: RequestToken,
        result: Result<String, GeocodeError>,
    },
}

/// Output of a transition: navigation for the renderer or work for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    SetView {
        center: Coordinate,
        zoom: u8,
    },
    PanTo(Coordinate),
    FetchNearby {
        token: RequestToken,
        reference: Coordinate,
        radius_km: f64,
    },
    ReverseGeocode {
        token: RequestToken,
        coordinate: Coordinate,
    },
    ShowModal(ListingId),
    HideModal,
}

/// Modal visibility as seen by the renderer. `listing` is `None` whenever the modal is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalState<'a> {
    pub is_open: bool,
    pub listing: Option<&'a Listing>,
}

/// Map interaction state: one phase, one view, one transition function.
#[derive(Debug)]
pub struct MapMachine {
    phase: MapPhase,
    view: MapView,
    markers: Vec<Listing>,
    default_center: Coordinate,
    radius_km: f64,
    tokens: TokenSequence,
    pending_nearby: Option<RequestToken>,
    pending_address: Option<RequestToken>,
    suppress_next_marker_click: bool,
}

impl MapMachine {
    pub fn new(default_center: Coordinate, radius_km: f64) -> Self {
        Self {
            phase: MapPhase::Idle,
            view: MapView {
                center: default_center,
                zoom: DEFAULT_ZOOM,
                marker_position: None,
                reference: None,
                bounds: None,
                notice: None,
            },
            markers: Vec::new(),
            default_center,
            radius_km,
            tokens: TokenSequence::default(),
            pending_nearby: None,
            pending_address: None,
            suppress_next_marker_click: false,
        }
    }

    pub fn phase(&self) -> &MapPhase {
        &self.phase
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn markers(&self) -> &[Listing] {
        &self.markers
    }

    pub fn highlighted_id(&self) -> Option<&ListingId> {
        match &self.phase {
            MapPhase::Highlighted { listing_id } => Some(listing_id),
            MapPhase::ModalOpen { listing } => Some(&listing.id),
            MapPhase::Idle | MapPhase::Located => None,
        }
    }

    pub fn modal(&self) -> ModalState<'_> {
        match &self.phase {
            MapPhase::ModalOpen { listing } => ModalState {
                is_open: true,
                listing: Some(listing),
            },
            _ => ModalState {
                is_open: false,
                listing: None,
            },
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.view.notice = Some(notice.into());
    }

    pub fn apply(&mut self, event: MapEvent) -> Vec<MapCommand> {
        match event {
            MapEvent::GeolocationResolved(coordinate) => self.on_geolocation(coordinate),
            MapEvent::GeolocationUnavailable(reason) => self.on_geolocation_unavailable(reason),
            MapEvent::PlaceSelected(reference) => self.on_place_selected(reference),
            MapEvent::MapClicked(coordinate) => self.on_map_clicked(coordinate),
            MapEvent::MarkerClicked(listing_id) => self.on_marker_clicked(listing_id),
            MapEvent::ViewDetails => self.on_view_details(),
            MapEvent::ModalClosed => self.on_modal_closed(),
            MapEvent::ViewportChanged(bounds) => {
                self.view.bounds = Some(bounds);
                Vec::new()
            }
            MapEvent::NearbyLoaded { token, listings } => self.on_nearby_loaded(token, listings),
            MapEvent::NearbyFailed { token, message } => self.on_nearby_failed(token, message),
            MapEvent::AddressResolved { token, result } => self.on_address_resolved(token, result),
        }
    }

    fn relocate(
        &mut self,
        reference: ReferenceLocation,
        zoom: u8,
        resolve_address: bool,
    ) -> Vec<MapCommand> {
        let center = reference.coordinate;
        self.phase = MapPhase::Located;
        self.view.center = center;
        self.view.zoom = zoom;
        self.view.marker_position = Some(center);
        self.view.reference = Some(reference);
        self.view.notice = None;

        let nearby_token = self.tokens.issue();
        self.pending_nearby = Some(nearby_token);

        let mut commands = vec![
            MapCommand::SetView { center, zoom },
            MapCommand::FetchNearby {
                token: nearby_token,
                reference: center,
                radius_km: self.radius_km,
            },
        ];

        if resolve_address {
            let address_token = self.tokens.issue();
            self.pending_address = Some(address_token);
            commands.push(MapCommand::ReverseGeocode {
                token: address_token,
                coordinate: center,
            });
        } else {
            self.pending_address = None;
        }

        commands
    }

    fn on_geolocation(&mut self, coordinate: Coordinate) -> Vec<MapCommand> {
        if self.phase != MapPhase::Idle {
            debug!("ignoring late geolocation fix; a reference is already set");
            return Vec::new();
        }
        self.relocate(
            ReferenceLocation::unresolved(coordinate),
            GEOLOCATION_ZOOM,
            true,
        )
    }

    fn on_geolocation_unavailable(&mut self, reason: GeolocationError) -> Vec<MapCommand> {
        if self.phase != MapPhase::Idle {
            return Vec::new();
        }
        warn!(?reason, "geolocation unavailable, falling back to default location");
        let commands = self.relocate(
            ReferenceLocation::unresolved(self.default_center),
            DEFAULT_ZOOM,
            false,
        );
        self.view.notice = Some("Current location unavailable; showing the default area".to_string());
        commands
    }

    fn on_place_selected(&mut self, reference: ReferenceLocation) -> Vec<MapCommand> {
        if matches!(self.phase, MapPhase::ModalOpen { .. }) {
            return Vec::new();
        }
        self.relocate(reference, PLACE_ZOOM, false)
    }

    fn on_map_clicked(&mut self, coordinate: Coordinate) -> Vec<MapCommand> {
        if matches!(self.phase, MapPhase::ModalOpen { .. }) {
            return Vec::new();
        }
        self.relocate(ReferenceLocation::unresolved(coordinate), CLICK_ZOOM, true)
    }

    fn on_marker_clicked(&mut self, listing_id: ListingId) -> Vec<MapCommand> {
        if self.suppress_next_marker_click {
            self.suppress_next_marker_click = false;
            debug!(%listing_id, "swallowed marker click that accompanied opening details");
            return Vec::new();
        }

        match &self.phase {
            MapPhase::Idle | MapPhase::ModalOpen { .. } => Vec::new(),
            MapPhase::Highlighted { listing_id: current } if *current == listing_id => {
                self.phase = MapPhase::Located;
                Vec::new()
            }
            MapPhase::Located | MapPhase::Highlighted { .. } => self.highlight(listing_id),
        }
    }

    fn highlight(&mut self, listing_id: ListingId) -> Vec<MapCommand> {
        let Some(listing) = self.markers.iter().find(|listing| listing.id == listing_id) else {
            debug!(%listing_id, "marker click for unknown listing");
            return Vec::new();
        };
        let coordinate = listing.coordinate();

        self.phase = MapPhase::Highlighted { listing_id };

        match coordinate {
            Some(coordinate) if self.needs_pan(&coordinate) => {
                self.view.center = coordinate;
                vec![MapCommand::PanTo(coordinate)]
            }
            _ => Vec::new(),
        }
    }

    fn needs_pan(&self, coordinate: &Coordinate) -> bool {
        match &self.view.bounds {
            Some(bounds) => !bounds
                .inset(SAFE_LATITUDE_INSET, SAFE_LONGITUDE_INSET)
                .contains(coordinate),
            None => true,
        }
    }

    fn on_view_details(&mut self) -> Vec<MapCommand> {
        let MapPhase::Highlighted { listing_id } = &self.phase else {
            return Vec::new();
        };
        let Some(listing) = self.markers.iter().find(|listing| listing.id == *listing_id) else {
            return Vec::new();
        };

        let listing = listing.clone();
        let id = listing.id.clone();
        self.phase = MapPhase::ModalOpen { listing };
        self.suppress_next_marker_click = true;
        vec![MapCommand::ShowModal(id)]
    }

    fn on_modal_closed(&mut self) -> Vec<MapCommand> {
        if !matches!(self.phase, MapPhase::ModalOpen { .. }) {
            return Vec::new();
        }
        self.phase = MapPhase::Located;
        self.suppress_next_marker_click = false;
        vec![MapCommand::HideModal]
    }

    fn on_nearby_loaded(&mut self, token: RequestToken, listings: Vec<Listing>) -> Vec<MapCommand> {
        if self.pending_nearby != Some(token) {
            debug!(?token, "dropping stale nearby results");
            return Vec::new();
        }
        self.pending_nearby = None;
        self.markers = listings;

        if let MapPhase::Highlighted { listing_id } = &self.phase {
            if !self.markers.iter().any(|listing| listing.id == *listing_id) {
                self.phase = MapPhase::Located;
            }
        }
        Vec::new()
    }

    fn on_nearby_failed(&mut self, token: RequestToken, message: String) -> Vec<MapCommand> {
        if self.pending_nearby != Some(token) {
            debug!(?token, "dropping stale nearby failure");
            return Vec::new();
        }
        warn!(%message, "nearby listings failed to load");
        self.pending_nearby = None;
        self.markers.clear();
        self.view.notice = Some(message);
        if matches!(self.phase, MapPhase::Highlighted { .. }) {
            self.phase = MapPhase::Located;
        }
        Vec::new()
    }

    fn on_address_resolved(
        &mut self,
        token: RequestToken,
        result: Result<String, GeocodeError>,
    ) -> Vec<MapCommand> {
        if self.pending_address != Some(token) {
            debug!(?token, "dropping stale reverse geocode");
            return Vec::new();
        }
        self.pending_address = None;

        let address = match result {
            Ok(address) => address,
            Err(err) => {
                warn!(error = %err, "reverse geocoding failed");
                ADDRESS_NOT_FOUND.to_string()
            }
        };
        if let Some(reference) = self.view.reference.as_mut() {
            reference.address = Some(address);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ListingLocation;

    fn point(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).expect("valid coordinate")
    }

    fn listing(id: &str, latitude: f64, longitude: f64) -> Listing {
        Listing {
            id: ListingId::from(id),
            name: id.to_string(),
            description: None,
            rich_content: None,
            thumbnail: None,
            location: Some(ListingLocation {
                lat: latitude,
                lng: longitude,
                address: String::new(),
            }),
            pickup: None,
            category_tag: None,
        }
    }

    fn nearby_token(commands: &[MapCommand]) -> RequestToken {
        commands
            .iter()
            .find_map(|command| match command {
                MapCommand::FetchNearby { token, .. } => Some(*token),
                _ => None,
            })
            .expect("nearby fetch requested")
    }

    fn address_token(commands: &[MapCommand]) -> Option<RequestToken> {
        commands.iter().find_map(|command| match command {
            MapCommand::ReverseGeocode { token, .. } => Some(*token),
            _ => None,
        })
    }

    /// Machine located in Tokyo with two markers and a known viewport.
    fn located() -> MapMachine {
        let mut machine = MapMachine::new(point(35.6895, 139.6917), 100.0);
        let commands = machine.apply(MapEvent::GeolocationResolved(point(35.6895, 139.6917)));
        let token = nearby_token(&commands);
        machine.apply(MapEvent::ViewportChanged(GeoBounds::new(
            35.5, 139.5, 35.9, 139.9,
        )));
        machine.apply(MapEvent::NearbyLoaded {
            token,
            listings: vec![
                listing("center", 35.70, 139.70),
                listing("edge", 35.52, 139.52),
            ],
        });
        machine
    }

    #[test]
    fn geolocation_moves_idle_to_located_with_zoom_10() {
        let mut machine = MapMachine::new(point(0.0, 0.0), 100.0);
        let here = point(35.6895, 139.6917);

        let commands = machine.apply(MapEvent::GeolocationResolved(here));

        assert_eq!(machine.phase(), &MapPhase::Located);
        assert_eq!(machine.view().center, here);
        assert_eq!(machine.view().zoom, GEOLOCATION_ZOOM);
        assert_eq!(machine.view().marker_position, Some(here));
        assert_eq!(
            commands[0],
            MapCommand::SetView {
                center: here,
                zoom: 10
            }
        );
        assert!(matches!(
            commands[1],
            MapCommand::FetchNearby { reference, radius_km, .. } if reference == here && radius_km == 100.0
        ));
    }

    #[test]
    fn late_geolocation_does_not_override_a_chosen_place() {
        let mut machine = MapMachine::new(point(0.0, 0.0), 100.0);
        machine.apply(MapEvent::PlaceSelected(ReferenceLocation::with_address(
            point(34.6937, 135.5023),
            "Osaka",
        )));

        let commands = machine.apply(MapEvent::GeolocationResolved(point(35.0, 139.0)));

        assert!(commands.is_empty());
        assert_eq!(machine.view().center, point(34.6937, 135.5023));
    }

    #[test]
    fn geolocation_unavailable_falls_back_to_default_center() {
        let fallback = point(35.6895, 139.6917);
        let mut machine = MapMachine::new(fallback, 100.0);

        let commands = machine.apply(MapEvent::GeolocationUnavailable(
            GeolocationError::PermissionDenied,
        ));

        assert_eq!(machine.phase(), &MapPhase::Located);
        assert_eq!(machine.view().center, fallback);
        assert_eq!(machine.view().zoom, DEFAULT_ZOOM);
        assert!(machine.view().notice.is_some());
        assert!(address_token(&commands).is_none());
    }

    #[test]
    fn place_selection_uses_zoom_15_and_keeps_the_address() {
        let mut machine = located();
        machine.apply(MapEvent::MarkerClicked(ListingId::from("center")));

        let osaka = point(34.6937, 135.5023);
        let commands = machine.apply(MapEvent::PlaceSelected(ReferenceLocation::with_address(
            osaka, "Osaka",
        )));

        assert_eq!(machine.phase(), &MapPhase::Located);
        assert_eq!(machine.view().zoom, PLACE_ZOOM);
        assert_eq!(
            machine.view().reference,
            Some(ReferenceLocation::with_address(osaka, "Osaka"))
        );
        assert!(address_token(&commands).is_none());
    }

    #[test]
    fn map_click_clears_highlight_and_geocodes_best_effort() {
        let mut machine = located();
        machine.apply(MapEvent::MarkerClicked(ListingId::from("center")));
        let clicked = point(35.66, 139.73);

        let commands = machine.apply(MapEvent::MapClicked(clicked));

        assert_eq!(machine.phase(), &MapPhase::Located);
        assert_eq!(machine.highlighted_id(), None);
        assert_eq!(machine.view().marker_position, Some(clicked));
        assert_eq!(machine.view().center, clicked);
        let token = address_token(&commands).expect("reverse geocode requested");
        assert_eq!(machine.view().reference.as_ref().and_then(|r| r.address.clone()), None);

        machine.apply(MapEvent::AddressResolved {
            token,
            result: Err(GeocodeError::Unresolved {
                status: "ZERO_RESULTS".to_string(),
            }),
        });
        assert_eq!(
            machine.view().reference.as_ref().and_then(|r| r.address.as_deref()),
            Some(ADDRESS_NOT_FOUND)
        );
        assert_eq!(machine.view().marker_position, Some(clicked));
    }

    #[test]
    fn stale_reverse_geocode_is_ignored() {
        let mut machine = located();
        let first = machine.apply(MapEvent::MapClicked(point(35.60, 139.60)));
        let second = machine.apply(MapEvent::MapClicked(point(35.61, 139.61)));
        let first_token = address_token(&first).expect("first lookup");
        let second_token = address_token(&second).expect("second lookup");

        machine.apply(MapEvent::AddressResolved {
            token: second_token,
            result: Ok("Second".to_string()),
        });
        machine.apply(MapEvent::AddressResolved {
            token: first_token,
            result: Ok("First".to_string()),
        });

        assert_eq!(
            machine.view().reference.as_ref().and_then(|r| r.address.as_deref()),
            Some("Second")
        );
    }

    #[test]
    fn stale_nearby_results_are_ignored() {
        let mut machine = located();
        let first = machine.apply(MapEvent::MapClicked(point(35.60, 139.60)));
        let second = machine.apply(MapEvent::MapClicked(point(35.61, 139.61)));

        machine.apply(MapEvent::NearbyLoaded {
            token: nearby_token(&second),
            listings: vec![listing("fresh", 35.61, 139.61)],
        });
        machine.apply(MapEvent::NearbyLoaded {
            token: nearby_token(&first),
            listings: vec![listing("stale", 35.60, 139.60)],
        });

        let ids: Vec<_> = machine.markers().iter().map(|l| l.id.0.as_str()).collect();
        assert_eq!(ids, vec!["fresh"]);
    }

    #[test]
    fn clicking_the_highlighted_marker_again_toggles_it_off() {
        let mut machine = located();
        let id = ListingId::from("center");

        machine.apply(MapEvent::MarkerClicked(id.clone()));
        assert_eq!(machine.highlighted_id(), Some(&id));

        machine.apply(MapEvent::MarkerClicked(id));
        assert_eq!(machine.phase(), &MapPhase::Located);
        assert_eq!(machine.highlighted_id(), None);
    }

    #[test]
    fn clicking_another_marker_moves_the_highlight_directly() {
        let mut machine = located();
        machine.apply(MapEvent::MarkerClicked(ListingId::from("center")));

        machine.apply(MapEvent::MarkerClicked(ListingId::from("edge")));

        assert_eq!(
            machine.phase(),
            &MapPhase::Highlighted {
                listing_id: ListingId::from("edge")
            }
        );
    }

    #[test]
    fn pans_only_when_marker_is_outside_safe_bounds() {
        let mut machine = located();

        let inside = machine.apply(MapEvent::MarkerClicked(ListingId::from("center")));
        assert!(inside.is_empty(), "marker inside safe bounds should not pan");
        assert_eq!(machine.view().center, point(35.6895, 139.6917));

        let outside = machine.apply(MapEvent::MarkerClicked(ListingId::from("edge")));
        assert_eq!(outside, vec![MapCommand::PanTo(point(35.52, 139.52))]);
        assert_eq!(machine.view().center, point(35.52, 139.52));
    }

    #[test]
    fn pans_when_viewport_is_unknown() {
        let mut machine = MapMachine::new(point(35.0, 139.0), 100.0);
        let commands = machine.apply(MapEvent::MapClicked(point(35.0, 139.0)));
        machine.apply(MapEvent::NearbyLoaded {
            token: nearby_token(&commands),
            listings: vec![listing("only", 35.01, 139.01)],
        });

        let pan = machine.apply(MapEvent::MarkerClicked(ListingId::from("only")));
        assert_eq!(pan, vec![MapCommand::PanTo(point(35.01, 139.01))]);
    }

    #[test]
    fn unknown_markers_and_idle_clicks_are_ignored() {
        let mut idle = MapMachine::new(point(35.0, 139.0), 100.0);
        assert!(idle.apply(MapEvent::MarkerClicked(ListingId::from("x"))).is_empty());
        assert_eq!(idle.phase(), &MapPhase::Idle);

        let mut machine = located();
        assert!(machine
            .apply(MapEvent::MarkerClicked(ListingId::from("ghost")))
            .is_empty());
        assert_eq!(machine.phase(), &MapPhase::Located);
    }

    #[test]
    fn view_details_opens_modal_and_swallows_the_accompanying_marker_click() {
        let mut machine = located();
        let id = ListingId::from("center");
        machine.apply(MapEvent::MarkerClicked(id.clone()));

        let commands = machine.apply(MapEvent::ViewDetails);
        assert_eq!(commands, vec![MapCommand::ShowModal(id.clone())]);

        // the click on the details button also reaches the marker
        machine.apply(MapEvent::MarkerClicked(id.clone()));

        let modal = machine.modal();
        assert!(modal.is_open);
        assert_eq!(modal.listing.map(|listing| &listing.id), Some(&id));
        assert_eq!(machine.highlighted_id(), Some(&id));
    }

    #[test]
    fn closing_the_modal_clears_selection_and_guard() {
        let mut machine = located();
        let id = ListingId::from("center");
        machine.apply(MapEvent::MarkerClicked(id.clone()));
        machine.apply(MapEvent::ViewDetails);

        let commands = machine.apply(MapEvent::ModalClosed);

        assert_eq!(commands, vec![MapCommand::HideModal]);
        assert_eq!(machine.phase(), &MapPhase::Located);
        assert_eq!(machine.modal().listing, None);
        assert!(!machine.modal().is_open);

        // guard was never consumed, but must not eat the next real click
        machine.apply(MapEvent::MarkerClicked(id.clone()));
        assert_eq!(machine.highlighted_id(), Some(&id));
    }

    #[test]
    fn view_details_requires_a_highlight() {
        let mut machine = located();
        assert!(machine.apply(MapEvent::ViewDetails).is_empty());
        assert!(!machine.modal().is_open);
    }

    #[test]
    fn map_clicks_are_ignored_while_modal_is_open() {
        let mut machine = located();
        machine.apply(MapEvent::MarkerClicked(ListingId::from("center")));
        machine.apply(MapEvent::ViewDetails);

        assert!(machine.apply(MapEvent::MapClicked(point(35.0, 139.0))).is_empty());
        assert!(machine.modal().is_open);
    }

    #[test]
    fn refreshed_markers_without_the_highlight_fall_back_to_located() {
        let mut machine = located();
        machine.apply(MapEvent::MarkerClicked(ListingId::from("center")));
        let commands = machine.apply(MapEvent::PlaceSelected(ReferenceLocation::with_address(
            point(35.70, 139.70),
            "Center",
        )));
        machine.apply(MapEvent::MarkerClicked(ListingId::from("edge")));

        machine.apply(MapEvent::NearbyLoaded {
            token: nearby_token(&commands),
            listings: vec![listing("center", 35.70, 139.70)],
        });

        assert_eq!(machine.phase(), &MapPhase::Located);
    }

    #[test]
    fn nearby_failure_surfaces_notice_and_clears_markers() {
        let mut machine = located();
        let commands = machine.apply(MapEvent::MapClicked(point(35.6, 139.6)));

        machine.apply(MapEvent::NearbyFailed {
            token: nearby_token(&commands),
            message: "content service request timed out".to_string(),
        });

        assert!(machine.markers().is_empty());
        assert_eq!(
            machine.view().notice.as_deref(),
            Some("content service request timed out")
        );
        assert_eq!(machine.phase(), &MapPhase::Located);
    }
}
