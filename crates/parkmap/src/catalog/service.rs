use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::client::{ContentClient, ContentPage, FetchError};
use super::domain::{Article, Listing, SearchResultSet};
use super::query::{ListQuery, Page, QueryError, SearchParams};

/// Collection names inside the content service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub listings: String,
    pub articles: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            listings: "parks".to_string(),
            articles: "blog".to_string(),
        }
    }
}

/// Listing fetcher: typed, paginated reads over the injected content client.
pub struct CatalogService<C> {
    client: Arc<C>,
    collections: Collections,
}

impl<C> CatalogService<C>
where
    C: ContentClient + 'static,
{
    pub fn new(client: Arc<C>, collections: Collections) -> Self {
        Self {
            client,
            collections,
        }
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Fetch one page of listings matching `params`.
    pub async fn fetch(
        &self,
        params: &SearchParams,
        page: Page,
    ) -> Result<SearchResultSet<Listing>, CatalogError> {
        let query = params.to_list_query(page)?;
        let raw = self
            .client
            .get_list(&self.collections.listings, &query)
            .await?;
        Ok(decode_page(raw, page))
    }

    pub async fn listing(&self, id: &str) -> Result<Listing, CatalogError> {
        let raw = self
            .client
            .get_one(&self.collections.listings, id)
            .await?
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })?;
        decode_record(raw)
    }

    pub async fn articles(&self, page: Page) -> Result<SearchResultSet<Article>, CatalogError> {
        let raw = self
            .client
            .get_list(&self.collections.articles, &ListQuery::page(page))
            .await?;
        Ok(decode_page(raw, page))
    }

    pub async fn article(&self, id: &str) -> Result<Article, CatalogError> {
        let raw = self
            .client
            .get_one(&self.collections.articles, id)
            .await?
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })?;
        decode_record(raw)
    }
}

fn decode_page<T: DeserializeOwned>(raw: ContentPage, page: Page) -> SearchResultSet<T> {
    let mut items = Vec::with_capacity(raw.contents.len());
    let mut fetched = 0u32;
    for value in raw.contents.into_iter().take(page.limit as usize) {
        fetched += 1;
        match serde_json::from_value::<T>(value) {
            Ok(item) => items.push(item),
            Err(err) => warn!(error = %err, "skipping malformed content record"),
        }
    }

    SearchResultSet {
        items,
        total_count: raw.total_count,
        limit: page.limit,
        offset: page.offset,
        fetched,
    }
}

fn decode_record<T: DeserializeOwned>(raw: Value) -> Result<T, CatalogError> {
    serde_json::from_value(raw).map_err(|err| FetchError::Decode(err.to_string()).into())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("no record with id '{id}'")]
    NotFound { id: String },
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
