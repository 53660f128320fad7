use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::catalog::client::{ContentClient, ContentPage, FetchError};
use crate::catalog::query::ListQuery;
use crate::catalog::{catalog_router, CatalogService, Collections};
use crate::nearby::NearbySettings;

/// Content client serving fixed collections from memory and recording every list query.
#[derive(Default)]
pub(super) struct MemoryContentClient {
    collections: HashMap<String, Vec<Value>>,
    failure: Option<FetchError>,
    queries: Mutex<Vec<(String, ListQuery)>>,
}

impl MemoryContentClient {
    pub(super) fn with_collection(mut self, name: &str, records: Vec<Value>) -> Self {
        self.collections.insert(name.to_string(), records);
        self
    }

    pub(super) fn failing(failure: FetchError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub(super) fn queries(&self) -> Vec<(String, ListQuery)> {
        self.queries.lock().expect("query log mutex").clone()
    }
}

#[async_trait]
impl ContentClient for MemoryContentClient {
    async fn get_list(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<ContentPage, FetchError> {
        self.queries
            .lock()
            .expect("query log mutex")
            .push((collection.to_string(), query.clone()));

        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        let records = self.collections.get(collection).cloned().unwrap_or_default();
        let contents = records
            .iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(ContentPage {
            contents,
            total_count: records.len() as u64,
            limit: query.limit,
            offset: query.offset,
        })
    }

    async fn get_one(&self, collection: &str, id: &str) -> Result<Option<Value>, FetchError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        Ok(self.collections.get(collection).and_then(|records| {
            records
                .iter()
                .find(|record| record.get("id").and_then(Value::as_str) == Some(id))
                .cloned()
        }))
    }
}

pub(super) fn park(id: &str, name: &str, lat: f64, lng: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "content": format!("<p>{name}</p><script>track('{id}')</script>"),
        "map": { "lat": lat, "lng": lng, "address": format!("{name} address") },
    })
}

pub(super) fn parks() -> Vec<Value> {
    vec![
        park("yoyogi", "Yoyogi Park", 35.6717, 139.6949),
        park("ueno", "Ueno Park", 35.7156, 139.7745),
        park("hakone", "Hakone Gardens", 35.2324, 139.1069),
        park("nara", "Nara Park", 34.6851, 135.8430),
        json!({ "id": "online", "name": "Virtual Park" }),
    ]
}

pub(super) fn articles() -> Vec<Value> {
    vec![
        json!({ "id": "a1", "title": "Cherry blossoms", "publishedAt": "2024-03-30T00:00:00Z", "content": "<p onclick=\"x()\">Pink</p>" }),
        json!({ "id": "a2", "title": "Autumn leaves", "publishedAt": "2024-11-20T00:00:00Z" }),
    ]
}

pub(super) fn seeded_client() -> Arc<MemoryContentClient> {
    Arc::new(
        MemoryContentClient::default()
            .with_collection("parks", parks())
            .with_collection("blog", articles()),
    )
}

pub(super) fn service(client: Arc<MemoryContentClient>) -> Arc<CatalogService<MemoryContentClient>> {
    Arc::new(CatalogService::new(client, Collections::default()))
}

pub(super) fn router(client: Arc<MemoryContentClient>) -> axum::Router {
    catalog_router(service(client), NearbySettings::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
