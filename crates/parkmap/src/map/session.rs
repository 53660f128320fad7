use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::geocode::Geocoder;
use super::machine::{MapCommand, MapEvent, MapMachine, ReferenceLocation};
use crate::catalog::ContentClient;
use crate::geo::Coordinate;
use crate::nearby::NearbySearch;

/// Drives a [`MapMachine`] against live collaborators.
///
/// Fetch and geocode commands run as background tasks whose results come back as events over a
/// channel. [`MapSession::dispatch`] returns the renderer commands at once; completed work is
/// applied through [`MapSession::next_update`] or [`MapSession::settle`]. The machine drops
/// responses for requests that a newer gesture has superseded.
///
/// Dispatching spawns onto the current Tokio runtime.
pub struct MapSession<C, G> {
    machine: MapMachine,
    nearby: NearbySearch<C>,
    geocoder: Arc<G>,
    results_tx: UnboundedSender<MapEvent>,
    results_rx: UnboundedReceiver<MapEvent>,
    in_flight: usize,
}

impl<C, G> MapSession<C, G>
where
    C: ContentClient + 'static,
    G: Geocoder + 'static,
{
    pub fn new(default_center: Coordinate, nearby: NearbySearch<C>, geocoder: Arc<G>) -> Self {
        let radius_km = nearby.settings().radius_km;
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            machine: MapMachine::new(default_center, radius_km),
            nearby,
            geocoder,
            results_tx,
            results_rx,
            in_flight: 0,
        }
    }

    pub fn machine(&self) -> &MapMachine {
        &self.machine
    }

    /// Background requests whose results have not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply a gesture; returns what the renderer should do now.
    pub fn dispatch(&mut self, event: MapEvent) -> Vec<MapCommand> {
        let commands = self.machine.apply(event);
        self.run(commands)
    }

    /// Wait for the next background result and apply it. `None` when nothing is in flight.
    pub async fn next_update(&mut self) -> Option<Vec<MapCommand>> {
        if self.in_flight == 0 {
            return None;
        }
        let event = self.results_rx.recv().await?;
        self.in_flight -= 1;
        Some(self.dispatch(event))
    }

    /// Apply every background result until nothing is in flight.
    pub async fn settle(&mut self) -> Vec<MapCommand> {
        let mut rendered = Vec::new();
        while let Some(commands) = self.next_update().await {
            rendered.extend(commands);
        }
        rendered
    }

    /// Resolve free text to a place and move the map there.
    pub async fn search_place(&mut self, text: &str) -> Vec<MapCommand> {
        match self.geocoder.geocode(text).await {
            Ok(place) => {
                info!(address = %place.formatted_address, "place selected");
                let reference =
                    ReferenceLocation::with_address(place.coordinate, place.formatted_address);
                self.dispatch(MapEvent::PlaceSelected(reference))
            }
            Err(err) => {
                warn!(error = %err, query = text, "place search failed");
                self.machine.set_notice(format!("No place found for '{text}'"));
                Vec::new()
            }
        }
    }

    fn run(&mut self, commands: Vec<MapCommand>) -> Vec<MapCommand> {
        let mut rendered = Vec::new();
        for command in commands {
            match command {
                MapCommand::FetchNearby {
                    token,
                    reference,
                    radius_km,
                } => {
                    let nearby = self.nearby.clone();
                    self.spawn(async move {
                        match nearby.around(&reference, Some(radius_km)).await {
                            Ok(found) => MapEvent::NearbyLoaded {
                                token,
                                listings: found.into_iter().map(|entry| entry.listing).collect(),
                            },
                            Err(err) => MapEvent::NearbyFailed {
                                token,
                                message: err.to_string(),
                            },
                        }
                    });
                }
                MapCommand::ReverseGeocode { token, coordinate } => {
                    let geocoder = Arc::clone(&self.geocoder);
                    self.spawn(async move {
                        let result = geocoder
                            .reverse_geocode(&coordinate)
                            .await
                            .map(|place| place.formatted_address);
                        MapEvent::AddressResolved { token, result }
                    });
                }
                other => rendered.push(other),
            }
        }
        rendered
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: std::future::Future<Output = MapEvent> + Send + 'static,
    {
        self.in_flight += 1;
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            if results.send(work.await).is_err() {
                debug!("map session dropped before a background result arrived");
            }
        });
    }
}
