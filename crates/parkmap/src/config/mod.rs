use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::catalog::Collections;
use crate::geo::{Coordinate, CoordinateError};
use crate::nearby::{valid_radius, NearbySettings};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub content: ContentConfig,
    pub geocoding: GeocodingConfig,
    pub map: MapConfig,
    pub nearby: NearbySettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let content = ContentConfig {
            service_domain: var_or("CONTENT_SERVICE_DOMAIN", ""),
            base_url_override: env::var("CONTENT_API_BASE_URL")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            api_key: var_or("CONTENT_API_KEY", ""),
            timeout: Duration::from_secs(parse_var("CONTENT_TIMEOUT_SECS", 10u64)?),
            listings_endpoint: var_or("CONTENT_LISTINGS_ENDPOINT", "parks"),
            articles_endpoint: var_or("CONTENT_ARTICLES_ENDPOINT", "blog"),
        };

        let geocoding = GeocodingConfig {
            api_key: var_or("GEOCODING_API_KEY", ""),
            base_url: var_or("GEOCODING_BASE_URL", DEFAULT_GEOCODING_URL),
            language: env::var("GEOCODING_LANGUAGE")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        };

        let default_center = Coordinate::new(
            parse_var("MAP_DEFAULT_LAT", 35.6895f64)?,
            parse_var("MAP_DEFAULT_LNG", 139.6917f64)?,
        )
        .map_err(|source| ConfigError::InvalidCoordinate { source })?;

        let defaults = NearbySettings::default();
        let radius_km = parse_var("NEARBY_RADIUS_KM", defaults.radius_km)?;
        if !valid_radius(radius_km) {
            return Err(ConfigError::InvalidRadius { value: radius_km });
        }
        let nearby = NearbySettings {
            radius_km,
            page_size: parse_var("NEARBY_PAGE_SIZE", defaults.page_size)?,
            max_pages: parse_var("NEARBY_MAX_PAGES", defaults.max_pages)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            content,
            geocoding,
            map: MapConfig { default_center },
            nearby,
        })
    }
}

const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
        }
        _ => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection to the headless content service.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub service_domain: String,
    pub base_url_override: Option<String>,
    pub api_key: String,
    pub timeout: Duration,
    pub listings_endpoint: String,
    pub articles_endpoint: String,
}

impl ContentConfig {
    /// Explicit override first, then `https://{domain}.microcms.io/api/v1`.
    pub fn base_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.base_url_override {
            return Ok(url.trim().to_string());
        }
        let domain = self.service_domain.trim();
        if domain.is_empty() {
            return Err(ConfigError::MissingContentEndpoint);
        }
        Ok(format!("https://{domain}.microcms.io/api/v1"))
    }

    pub fn collections(&self) -> Collections {
        Collections {
            listings: self.listings_endpoint.clone(),
            articles: self.articles_endpoint.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub api_key: String,
    pub base_url: String,
    /// Language for formatted addresses; the provider default when unset.
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct MapConfig {
    /// Reference used when geolocation is unavailable.
    pub default_center: Coordinate,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidCoordinate { source: CoordinateError },
    InvalidRadius { value: f64 },
    MissingContentEndpoint,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be numeric, got '{value}'")
            }
            ConfigError::InvalidCoordinate { source } => {
                write!(f, "MAP_DEFAULT_LAT/MAP_DEFAULT_LNG out of range: {source}")
            }
            ConfigError::InvalidRadius { value } => {
                write!(f, "NEARBY_RADIUS_KM must be finite and non-negative, got {value}")
            }
            ConfigError::MissingContentEndpoint => write!(
                f,
                "set CONTENT_SERVICE_DOMAIN or CONTENT_API_BASE_URL to reach the content service"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidCoordinate { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidRadius { .. }
            | ConfigError::MissingContentEndpoint => None,
        }
    }
}
