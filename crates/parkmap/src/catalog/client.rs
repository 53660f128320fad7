use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::query::ListQuery;

const API_KEY_HEADER: &str = "X-MICROCMS-API-KEY";

/// Failure talking to the content service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("content service request timed out")]
    Timeout,
    #[error("content service unreachable: {0}")]
    Transport(String),
    #[error("content service responded with status {status}")]
    Status { status: u16 },
    #[error("unexpected content service payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Raw page of a collection, items still undecoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage {
    #[serde(default)]
    pub contents: Vec<Value>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

/// Read access to the headless content service.
#[async_trait]
pub trait ContentClient: Send + Sync {
    async fn get_list(&self, collection: &str, query: &ListQuery)
        -> Result<ContentPage, FetchError>;

    /// `Ok(None)` when the service has no record with this id.
    async fn get_one(&self, collection: &str, id: &str) -> Result<Option<Value>, FetchError>;
}

/// REST client for the content service, constructed once at startup and shared by handle.
#[derive(Debug, Clone)]
pub struct HttpContentClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpContentClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| FetchError::Transport(format!("invalid base url '{base_url}': {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Transport(format!(
                "base url '{base_url}' cannot carry a path"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl ContentClient for HttpContentClient {
    async fn get_list(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<ContentPage, FetchError> {
        let url = self.endpoint(&[collection]);
        debug!(%url, ?query, "fetching content list");

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query.to_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<ContentPage>().await?)
    }

    async fn get_one(&self, collection: &str, id: &str) -> Result<Option<Value>, FetchError> {
        let url = self.endpoint(&[collection, id]);
        debug!(%url, "fetching content record");

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<Value>().await?)),
            status => Err(FetchError::Status {
                status: status.as_u16(),
            }),
        }
    }
}
