//! Radius filtering of listings around a reference coordinate.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{CatalogError, CatalogService, ContentClient, Listing, Page, SearchParams};
use crate::geo::{haversine_km, Coordinate};

pub const DEFAULT_RADIUS_KM: f64 = 100.0;

/// A usable search radius: finite and not negative.
pub fn valid_radius(radius_km: f64) -> bool {
    radius_km.is_finite() && radius_km >= 0.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyListing {
    pub listing: Listing,
    pub distance_km: f64,
}

/// Listings within `radius_km` of `reference`, with their distance, in input order.
pub fn nearby_with_distance<I>(listings: I, reference: &Coordinate, radius_km: f64) -> Vec<NearbyListing>
where
    I: IntoIterator<Item = Listing>,
{
    listings
        .into_iter()
        .filter_map(|listing| {
            let coordinate = listing.coordinate()?;
            let distance_km = haversine_km(reference, &coordinate);
            (distance_km <= radius_km).then_some(NearbyListing {
                listing,
                distance_km,
            })
        })
        .collect()
}

/// Stable filter: keeps listings that have a location within `radius_km` of `reference`.
pub fn filter_nearby<I>(listings: I, reference: &Coordinate, radius_km: f64) -> Vec<Listing>
where
    I: IntoIterator<Item = Listing>,
{
    nearby_with_distance(listings, reference, radius_km)
        .into_iter()
        .map(|entry| entry.listing)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySettings {
    pub radius_km: f64,
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for NearbySettings {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            page_size: 100,
            max_pages: 5,
        }
    }
}

/// Fetches candidate listings page by page and narrows them to a radius.
pub struct NearbySearch<C> {
    catalog: Arc<CatalogService<C>>,
    settings: NearbySettings,
}

impl<C> Clone for NearbySearch<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            settings: self.settings,
        }
    }
}

impl<C> NearbySearch<C>
where
    C: ContentClient + 'static,
{
    pub fn new(catalog: Arc<CatalogService<C>>, settings: NearbySettings) -> Self {
        Self { catalog, settings }
    }

    pub fn settings(&self) -> NearbySettings {
        self.settings
    }

    pub async fn candidates(&self) -> Result<Vec<Listing>, CatalogError> {
        let params = SearchParams::default();
        let mut collected = Vec::new();
        let mut offset = 0;

        for _ in 0..self.settings.max_pages.max(1) {
            let page = self
                .catalog
                .fetch(&params, Page::new(self.settings.page_size, offset))
                .await?;
            let more = page.has_next_page();
            offset = page.next_offset();
            collected.extend(page.items);

            if !more {
                break;
            }
        }

        Ok(collected)
    }

    /// Listings around `reference`; `radius_km` falls back to the configured radius.
    pub async fn around(
        &self,
        reference: &Coordinate,
        radius_km: Option<f64>,
    ) -> Result<Vec<NearbyListing>, CatalogError> {
        let radius_km = radius_km.unwrap_or(self.settings.radius_km);
        let candidates = self.candidates().await?;
        let total = candidates.len();
        let nearby = nearby_with_distance(candidates, reference, radius_km);
        debug!(
            latitude = reference.latitude,
            longitude = reference.longitude,
            radius_km,
            candidates = total,
            matched = nearby.len(),
            "nearby search complete"
        );
        Ok(nearby)
    }
}
