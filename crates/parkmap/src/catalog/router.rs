use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::client::ContentClient;
use super::domain::{ArticleView, ListingView};
use super::query::{Page, SearchParams};
use super::service::{CatalogError, CatalogService};
use crate::geo::Coordinate;
use crate::nearby::{valid_radius, NearbySearch, NearbySettings};

/// Shared handles for the catalog routes.
pub struct CatalogState<C> {
    pub catalog: Arc<CatalogService<C>>,
    pub nearby: NearbySearch<C>,
}

impl<C> Clone for CatalogState<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            nearby: self.nearby.clone(),
        }
    }
}

/// Router exposing listing search, nearby lookup, detail, and article endpoints.
pub fn catalog_router<C>(catalog: Arc<CatalogService<C>>, nearby: NearbySettings) -> Router
where
    C: ContentClient + 'static,
{
    let state = CatalogState {
        nearby: NearbySearch::new(Arc::clone(&catalog), nearby),
        catalog,
    };

    Router::new()
        .route("/listings", get(list_handler::<C>))
        .route("/listings/nearby", get(nearby_handler::<C>))
        .route("/listings/:id", get(listing_handler::<C>))
        .route("/articles", get(articles_handler::<C>))
        .route("/articles/:id", get(article_handler::<C>))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQueryParams {
    pub q: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_after: Option<String>,
    pub pickup_only: Option<String>,
    pub filters: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListingQueryParams {
    fn search_params(&self) -> SearchParams {
        SearchParams {
            free_text_query: self.q.clone(),
            title_contains: self.title.clone(),
            description_contains: self.description.clone(),
            content_contains: self.content.clone(),
            published_after: self.published_after.clone(),
            pickup_only: matches!(
                self.pickup_only.as_deref().map(str::trim),
                Some("true" | "1")
            ),
            raw_filters: self.filters.clone(),
        }
    }

    fn page(&self) -> Page {
        Page::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQueryParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius_km: Option<String>,
}

impl NearbyQueryParams {
    fn reference(&self) -> Result<Coordinate, String> {
        let lat = parse_number("lat", self.lat.as_deref())?;
        let lng = parse_number("lng", self.lng.as_deref())?;
        Coordinate::new(lat, lng).map_err(|err| err.to_string())
    }

    fn radius_km(&self) -> Result<Option<f64>, String> {
        match self.radius_km.as_deref() {
            None => Ok(None),
            Some(raw) => {
                let radius = parse_number("radiusKm", Some(raw))?;
                if valid_radius(radius) {
                    Ok(Some(radius))
                } else {
                    Err("radiusKm must be a non-negative number".to_string())
                }
            }
        }
    }
}

fn parse_number(name: &str, raw: Option<&str>) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("{name} is required"))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("{name} must be a number, got '{raw}'"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NearbyEntry {
    listing: ListingView,
    distance_km: f64,
}

pub(crate) fn catalog_error_response(error: CatalogError) -> Response {
    let status = match &error {
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        CatalogError::Fetch(err) => {
            warn!(error = %err, "content service request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn bad_request(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

pub(crate) async fn list_handler<C>(
    State(state): State<CatalogState<C>>,
    Query(params): Query<ListingQueryParams>,
) -> Response
where
    C: ContentClient + 'static,
{
    match state
        .catalog
        .fetch(&params.search_params(), params.page())
        .await
    {
        Ok(results) => {
            let body = results.map(ListingView::from);
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => catalog_error_response(error),
    }
}

pub(crate) async fn nearby_handler<C>(
    State(state): State<CatalogState<C>>,
    Query(params): Query<NearbyQueryParams>,
) -> Response
where
    C: ContentClient + 'static,
{
    let reference = match params.reference() {
        Ok(reference) => reference,
        Err(message) => return bad_request(message),
    };
    let radius_km = match params.radius_km() {
        Ok(radius) => radius.unwrap_or(state.nearby.settings().radius_km),
        Err(message) => return bad_request(message),
    };

    match state.nearby.around(&reference, Some(radius_km)).await {
        Ok(nearby) => {
            let contents: Vec<NearbyEntry> = nearby
                .into_iter()
                .map(|entry| NearbyEntry {
                    listing: ListingView::from(entry.listing),
                    distance_km: entry.distance_km,
                })
                .collect();
            let payload = json!({
                "reference": reference,
                "radiusKm": radius_km,
                "totalCount": contents.len(),
                "contents": contents,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => catalog_error_response(error),
    }
}

pub(crate) async fn listing_handler<C>(
    State(state): State<CatalogState<C>>,
    Path(id): Path<String>,
) -> Response
where
    C: ContentClient + 'static,
{
    match state.catalog.listing(&id).await {
        Ok(listing) => (StatusCode::OK, axum::Json(ListingView::from(listing))).into_response(),
        Err(error) => catalog_error_response(error),
    }
}

pub(crate) async fn articles_handler<C>(
    State(state): State<CatalogState<C>>,
    Query(params): Query<PageParams>,
) -> Response
where
    C: ContentClient + 'static,
{
    let page = Page::parse(params.limit.as_deref(), params.offset.as_deref());
    match state.catalog.articles(page).await {
        Ok(results) => {
            let body = results.map(ArticleView::from);
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => catalog_error_response(error),
    }
}

pub(crate) async fn article_handler<C>(
    State(state): State<CatalogState<C>>,
    Path(id): Path<String>,
) -> Response
where
    C: ContentClient + 'static,
{
    match state.catalog.article(&id).await {
        Ok(article) => (StatusCode::OK, axum::Json(ArticleView::from(article))).into_response(),
        Err(error) => catalog_error_response(error),
    }
}
