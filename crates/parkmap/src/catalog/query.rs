//! Search parameters and the content service's filter expression grammar.
//!
//! Clauses look like `field[operator]value` and are joined with `[or]` / `[and]`.

use chrono::{DateTime, NaiveDate};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Largest page the content service will return.
pub const MAX_PAGE_LIMIT: u32 = 100;

const TITLE_FIELD: &str = "name";
const DESCRIPTION_FIELD: &str = "description";
const CONTENT_FIELD: &str = "content";
const PUBLISHED_FIELD: &str = "publishedAt";
const PICKUP_FIELD: &str = "pickup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Clamp `limit` into `1..=MAX_PAGE_LIMIT`.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset,
        }
    }

    /// Lenient parse of raw query values; anything non-numeric falls back to the defaults.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = offset
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Self::new(limit, offset)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("publishedAfter must be an RFC 3339 timestamp or YYYY-MM-DD, got '{0}'")]
    InvalidPublishedAfter(String),
}

/// User-facing search options for the listing collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub free_text_query: Option<String>,
    pub title_contains: Option<String>,
    pub description_contains: Option<String>,
    pub content_contains: Option<String>,
    pub published_after: Option<String>,
    pub pickup_only: bool,
    /// Pre-built filter expression, used only when no detail field is set.
    pub raw_filters: Option<String>,
}

/// Query handed to the content client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub q: Option<String>,
    pub filters: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl ListQuery {
    pub fn page(page: Page) -> Self {
        Self {
            q: None,
            filters: None,
            limit: page.limit,
            offset: page.offset,
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(filters) = &self.filters {
            pairs.push(("filters", filters.clone()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn validate_published_after(raw: &str) -> Result<(), QueryError> {
    if DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
    {
        Ok(())
    } else {
        Err(QueryError::InvalidPublishedAfter(raw.to_string()))
    }
}

impl SearchParams {
    /// Detail fields OR-ed into one expression, or `None` when none is set.
    pub fn detail_expression(&self) -> Result<Option<String>, QueryError> {
        let mut clauses = Vec::new();

        if let Some(title) = non_empty(&self.title_contains) {
            clauses.push(format!("{TITLE_FIELD}[contains]{title}"));
        }
        if let Some(description) = non_empty(&self.description_contains) {
            clauses.push(format!("{DESCRIPTION_FIELD}[contains]{description}"));
        }
        if let Some(content) = non_empty(&self.content_contains) {
            clauses.push(format!("{CONTENT_FIELD}[contains]{content}"));
        }
        if let Some(published_after) = non_empty(&self.published_after) {
            validate_published_after(published_after)?;
            clauses.push(format!("{PUBLISHED_FIELD}[greater_than]{published_after}"));
        }

        if clauses.is_empty() {
            Ok(None)
        } else {
            Ok(Some(clauses.join("[or]")))
        }
    }

    pub fn to_list_query(&self, page: Page) -> Result<ListQuery, QueryError> {
        let detail = self.detail_expression()?;
        let detail_set = detail.is_some();

        let mut filters = detail.or_else(|| non_empty(&self.raw_filters).map(str::to_string));
        if self.pickup_only {
            let pickup = format!("{PICKUP_FIELD}[equals]true");
            filters = Some(match filters {
                Some(expression) => format!("{expression}[and]{pickup}"),
                None => pickup,
            });
        }

        let q = if detail_set {
            None
        } else {
            non_empty(&self.free_text_query).map(str::to_string)
        };

        Ok(ListQuery {
            q,
            filters,
            limit: page.limit,
            offset: page.offset,
        })
    }
}
