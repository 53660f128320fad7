use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use parkmap::catalog::{catalog_router, CatalogService, ContentClient};
use parkmap::nearby::NearbySettings;
use parkmap::profile::{profile_router, ProfileService, ProfileStore};
use serde_json::json;
use std::sync::Arc;

/// Catalog and profile routes plus the operational endpoints.
pub(crate) fn with_service_routes<C, S>(
    catalog: Arc<CatalogService<C>>,
    nearby: NearbySettings,
    profiles: Arc<ProfileService<S>>,
) -> Router
where
    C: ContentClient + 'static,
    S: ProfileStore + 'static,
{
    catalog_router(catalog, nearby)
        .merge(profile_router(profiles))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
