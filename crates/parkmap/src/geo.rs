//! Coordinates, great-circle distance, and viewport bounds.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for all distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid degree ranges (NaN included).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

fn to_radians(degrees: f64) -> f64 {
    degrees * (std::f64::consts::PI / 180.0)
}

/// Great-circle distance in kilometres between two points.
///
/// Total over any input; range checks are the caller's responsibility.
pub fn haversine_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = to_radians(from.latitude);
    let lat2 = to_radians(to.latitude);
    let delta_lat = to_radians(to.latitude - from.latitude);
    let delta_lng = to_radians(to.longitude - from.longitude);

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rectangular viewport reported by the map renderer.
///
/// `west > east` means the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    fn longitude_span(&self) -> f64 {
        if self.west <= self.east {
            self.east - self.west
        } else {
            360.0 - (self.west - self.east)
        }
    }

    /// Shrink the box by the given fraction of its span on each side.
    pub fn inset(&self, latitude_fraction: f64, longitude_fraction: f64) -> Self {
        let lat_margin = (self.north - self.south) * latitude_fraction;
        let lng_margin = self.longitude_span() * longitude_fraction;

        Self {
            south: self.south + lat_margin,
            north: self.north - lat_margin,
            west: wrap_longitude(self.west + lng_margin),
            east: wrap_longitude(self.east - lng_margin),
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        if point.latitude < self.south || point.latitude > self.north {
            return false;
        }

        if self.west <= self.east {
            point.longitude >= self.west && point.longitude <= self.east
        } else {
            point.longitude >= self.west || point.longitude <= self.east
        }
    }
}

fn wrap_longitude(value: f64) -> f64 {
    if value > 180.0 {
        value - 360.0
    } else if value < -180.0 {
        value + 360.0
    } else {
        value
    }
}
