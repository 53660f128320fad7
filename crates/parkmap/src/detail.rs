//! Detail panel for a single listing.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{CatalogError, CatalogService, ContentClient, Listing, ListingId};
use crate::sanitize::SanitizedHtml;
use crate::token::{RequestToken, TokenSequence};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailPanel {
    Closed { error: Option<String> },
    Loading { listing_id: ListingId, token: RequestToken },
    Open { listing: Listing },
}

impl Default for DetailPanel {
    fn default() -> Self {
        DetailPanel::Closed { error: None }
    }
}

/// Opens, loads and closes the detail panel. While loading no listing is ever exposed.
pub struct DetailController<C> {
    catalog: Arc<CatalogService<C>>,
    state: DetailPanel,
    tokens: TokenSequence,
}

impl<C> DetailController<C>
where
    C: ContentClient + 'static,
{
    pub fn new(catalog: Arc<CatalogService<C>>) -> Self {
        Self {
            catalog,
            state: DetailPanel::default(),
            tokens: TokenSequence::default(),
        }
    }

    pub fn state(&self) -> &DetailPanel {
        &self.state
    }

    /// Enter the loading state for `listing_id`; the returned token must accompany the result.
    pub fn open(&mut self, listing_id: ListingId) -> RequestToken {
        let token = self.tokens.issue();
        self.state = DetailPanel::Loading { listing_id, token };
        token
    }

    pub fn resolve(&mut self, token: RequestToken, result: Result<Listing, CatalogError>) {
        let DetailPanel::Loading {
            token: current,
            listing_id,
        } = &self.state
        else {
            debug!(?token, "detail result arrived after the panel left loading");
            return;
        };
        if *current != token {
            debug!(?token, "dropping stale detail result");
            return;
        }

        self.state = match result {
            Ok(listing) => DetailPanel::Open { listing },
            Err(err) => {
                warn!(%listing_id, error = %err, "failed to load listing detail");
                DetailPanel::Closed {
                    error: Some(error_message(&err)),
                }
            }
        };
    }

    /// Open the panel and fetch the listing in one step.
    pub async fn load(&mut self, listing_id: ListingId) {
        let token = self.open(listing_id.clone());
        let result = self.catalog.listing(listing_id.as_str()).await;
        self.resolve(token, result);
    }

    pub fn close(&mut self) {
        let error = match &mut self.state {
            DetailPanel::Closed { error } => error.take(),
            _ => None,
        };
        self.state = DetailPanel::Closed { error };
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DetailPanel::Closed { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DetailPanel::Loading { .. })
    }

    pub fn listing(&self) -> Option<&Listing> {
        match &self.state {
            DetailPanel::Open { listing } => Some(listing),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            DetailPanel::Closed { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn rendered_content(&self) -> Option<SanitizedHtml> {
        self.listing().map(Listing::sanitized_content)
    }
}

fn error_message(error: &CatalogError) -> String {
    match error {
        CatalogError::NotFound { .. } => "This listing is no longer available.".to_string(),
        CatalogError::InvalidQuery(err) => err.to_string(),
        CatalogError::Fetch(_) => "Failed to load listing details. Please try again.".to_string(),
    }
}
