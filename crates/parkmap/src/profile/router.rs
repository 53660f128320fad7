use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::service::{ProfileError, ProfileService, ProfileStore, SignInIdentity};

pub fn profile_router<S>(service: Arc<ProfileService<S>>) -> Router
where
    S: ProfileStore + 'static,
{
    Router::new()
        .route("/profiles", post(ensure_handler::<S>))
        .route("/profiles/:uid", get(profile_handler::<S>))
        .route("/profiles/:uid/address", put(address_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct AddressUpdate {
    pub address: String,
}

fn error_response(error: ProfileError) -> Response {
    let status = match &error {
        ProfileError::NotFound { .. } => StatusCode::NOT_FOUND,
        ProfileError::InvalidIdentity(_) => StatusCode::BAD_REQUEST,
        ProfileError::Store(err) => {
            warn!(error = %err, "profile store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

async fn ensure_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    axum::Json(identity): axum::Json<SignInIdentity>,
) -> Response
where
    S: ProfileStore + 'static,
{
    match service.ensure_profile(identity) {
        Ok(ensured) => {
            let status = if ensured.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(ensured.profile)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn profile_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    Path(uid): Path<String>,
) -> Response
where
    S: ProfileStore + 'static,
{
    match service.get(&uid) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn address_handler<S>(
    State(service): State<Arc<ProfileService<S>>>,
    Path(uid): Path<String>,
    axum::Json(update): axum::Json<AddressUpdate>,
) -> Response
where
    S: ProfileStore + 'static,
{
    match service.update_address(&uid, &update.address) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}
