//! Park and property search: content catalog access, nearby filtering, and the map and
//! detail-panel interaction models that sit on top of them.

pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod geo;
pub mod map;
pub mod nearby;
pub mod profile;
pub mod sanitize;
pub mod telemetry;
pub mod token;

pub use error::AppError;
