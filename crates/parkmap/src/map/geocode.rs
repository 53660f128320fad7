use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::geo::Coordinate;

/// A geocoding hit: where it is and how the provider spells the address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub formatted_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    #[error("no geocoding result (status {status})")]
    Unresolved { status: String },
    #[error("geocoding request timed out")]
    Timeout,
    #[error("geocoding service unreachable: {0}")]
    Transport(String),
    #[error("unexpected geocoding payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodeError::Timeout
        } else if err.is_decode() {
            GeocodeError::Decode(err.to_string())
        } else {
            GeocodeError::Transport(err.to_string())
        }
    }
}

/// Forward and reverse geocoding provided by the mapping service.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<GeocodedPlace, GeocodeError>;
    async fn reverse_geocode(&self, coordinate: &Coordinate)
        -> Result<GeocodedPlace, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn first_place(response: GeocodeResponse) -> Result<GeocodedPlace, GeocodeError> {
    if response.status != "OK" {
        return Err(GeocodeError::Unresolved {
            status: response.status,
        });
    }

    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::Unresolved {
            status: "ZERO_RESULTS".to_string(),
        })?;

    let LatLng { lat, lng } = result.geometry.location;
    let coordinate =
        Coordinate::new(lat, lng).map_err(|err| GeocodeError::Decode(err.to_string()))?;

    Ok(GeocodedPlace {
        coordinate,
        formatted_address: result.formatted_address,
    })
}

/// JSON geocoding API client (`address=` / `latlng=` queries).
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    language: Option<String>,
}

impl HttpGeocoder {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| GeocodeError::Transport(format!("invalid base url '{base_url}': {err}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
            language: None,
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    async fn request(&self, lookup: (&str, String)) -> Result<GeocodedPlace, GeocodeError> {
        let mut params = vec![lookup, ("key", self.api_key.clone())];
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }

        let response = self
            .http
            .get(self.base_url.clone())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Transport(format!(
                "geocoding service responded with status {}",
                status.as_u16()
            )));
        }

        let body = response.json::<GeocodeResponse>().await?;
        debug!(status = %body.status, results = body.results.len(), "geocoding response");
        first_place(body)
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeocodedPlace, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::Unresolved {
                status: "INVALID_REQUEST".to_string(),
            });
        }
        self.request(("address", query.to_string())).await
    }

    async fn reverse_geocode(
        &self,
        coordinate: &Coordinate,
    ) -> Result<GeocodedPlace, GeocodeError> {
        let latlng = format!("{},{}", coordinate.latitude, coordinate.longitude);
        self.request(("latlng", latlng)).await
    }
}
