use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::sanitize::{sanitize_html, SanitizedHtml};

/// Identifier assigned to a listing by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Map field of a listing as stored by the content service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
}

impl ListingLocation {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.lat, self.lng).ok()
    }
}

/// A park or property entry, read-only copy of the content service record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Untrusted HTML; render only through [`Listing::sanitized_content`].
    #[serde(rename = "content", default, skip_serializing_if = "Option::is_none")]
    pub rich_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    #[serde(rename = "map", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ListingLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup: Option<bool>,
    #[serde(rename = "category", default, skip_serializing_if = "Option::is_none")]
    pub category_tag: Option<String>,
}

impl Listing {
    /// Location as a validated coordinate; out-of-range map data counts as no location.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.location.as_ref().and_then(ListingLocation::coordinate)
    }

    pub fn sanitized_content(&self) -> SanitizedHtml {
        self.rich_content
            .as_deref()
            .map(sanitize_html)
            .unwrap_or_default()
    }
}

/// Listing as returned by this service's own API: rich content already sanitized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub id: ListingId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<SanitizedHtml>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<ListingLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl From<Listing> for ListingView {
    fn from(listing: Listing) -> Self {
        let content = listing.rich_content.as_deref().map(sanitize_html);
        Self {
            id: listing.id,
            name: listing.name,
            description: listing.description,
            content,
            thumbnail: listing.thumbnail,
            map: listing.location,
            pickup: listing.pickup,
            category: listing.category_tag,
        }
    }
}

/// Blog-style article kept in a second collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<SanitizedHtml>,
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            content: article.content.as_deref().map(sanitize_html),
            id: article.id,
            title: article.title,
            published_at: article.published_at,
        }
    }
}

/// One page of a collection. `items.len() <= limit` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultSet<T> {
    #[serde(rename = "contents")]
    pub items: Vec<T>,
    pub total_count: u64,
    pub limit: u32,
    pub offset: u32,
    /// Records the content service returned for this window, malformed ones included.
    #[serde(skip)]
    pub fetched: u32,
}

impl<T> SearchResultSet<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResultSet<U> {
        SearchResultSet {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            limit: self.limit,
            offset: self.offset,
            fetched: self.fetched,
        }
    }

    /// Offset of the window after this one.
    pub fn next_offset(&self) -> u32 {
        self.offset.saturating_add(self.fetched)
    }

    pub fn has_next_page(&self) -> bool {
        self.fetched > 0 && u64::from(self.next_offset()) < self.total_count
    }
}
