//! Listings and articles held by the headless content service.
//!
//! The service is reached only through the [`ContentClient`] trait; [`CatalogService`] adds
//! query construction, pagination, and typed decoding on top, and [`catalog_router`] exposes
//! the result over HTTP with rich content sanitized.

pub mod client;
pub mod domain;
pub mod query;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use client::{ContentClient, ContentPage, FetchError, HttpContentClient};
pub use domain::{
    Article, ArticleView, Listing, ListingId, ListingLocation, ListingView, SearchResultSet,
    Thumbnail,
};
pub use query::{ListQuery, Page, QueryError, SearchParams, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use router::catalog_router;
pub use service::{CatalogError, CatalogService, Collections};
