use metrics_exporter_prometheus::PrometheusHandle;
use parkmap::catalog::{CatalogService, HttpContentClient};
use parkmap::config::AppConfig;
use parkmap::error::AppError;
use parkmap::map::HttpGeocoder;
use parkmap::profile::{ProfileStore, ProfileStoreError, UserProfile};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Content client and catalog built from configuration; fails if no endpoint is configured.
pub(crate) fn build_catalog(
    config: &AppConfig,
) -> Result<Arc<CatalogService<HttpContentClient>>, AppError> {
    let base_url = config.content.base_url()?;
    let client = HttpContentClient::new(&base_url, &config.content.api_key, config.content.timeout)
        .map_err(parkmap::catalog::CatalogError::from)?;
    Ok(Arc::new(CatalogService::new(
        Arc::new(client),
        config.content.collections(),
    )))
}

pub(crate) fn build_geocoder(config: &AppConfig) -> Result<HttpGeocoder, AppError> {
    let geocoder = HttpGeocoder::new(
        &config.geocoding.base_url,
        &config.geocoding.api_key,
        config.content.timeout,
    )?;
    Ok(match &config.geocoding.language {
        Some(language) => geocoder.with_language(language.as_str()),
        None => geocoder,
    })
}

fn poisoned<T>(_: PoisonError<T>) -> ProfileStoreError {
    ProfileStoreError::Unavailable("profile store mutex poisoned".to_string())
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    profiles: Arc<Mutex<HashMap<String, UserProfile>>>,
}

impl ProfileStore for InMemoryProfileStore {
    fn insert(&self, profile: UserProfile) -> Result<UserProfile, ProfileStoreError> {
        let mut guard = self.profiles.lock().map_err(poisoned)?;
        if guard.contains_key(&profile.uid) {
            return Err(ProfileStoreError::Conflict);
        }
        guard.insert(profile.uid.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: UserProfile) -> Result<(), ProfileStoreError> {
        let mut guard = self.profiles.lock().map_err(poisoned)?;
        if guard.contains_key(&profile.uid) {
            guard.insert(profile.uid.clone(), profile);
            Ok(())
        } else {
            Err(ProfileStoreError::NotFound)
        }
    }

    fn fetch(&self, uid: &str) -> Result<Option<UserProfile>, ProfileStoreError> {
        let guard = self.profiles.lock().map_err(poisoned)?;
        Ok(guard.get(uid).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(uid: &str) -> UserProfile {
        UserProfile {
            uid: uid.to_string(),
            display_name: String::new(),
            email: format!("{uid}@example.com"),
            address: String::new(),
        }
    }

    #[test]
    fn insert_rejects_duplicates() {
        let store = InMemoryProfileStore::default();
        store.insert(profile("u-1")).expect("first insert");
        assert!(matches!(
            store.insert(profile("u-1")),
            Err(ProfileStoreError::Conflict)
        ));
    }

    #[test]
    fn update_requires_existing_record() {
        let store = InMemoryProfileStore::default();
        assert!(matches!(
            store.update(profile("ghost")),
            Err(ProfileStoreError::NotFound)
        ));

        store.insert(profile("u-2")).expect("insert");
        let mut changed = profile("u-2");
        changed.address = "Ueno".to_string();
        store.update(changed).expect("update");
        assert_eq!(
            store.fetch("u-2").expect("fetch").map(|p| p.address),
            Some("Ueno".to_string())
        );
    }
}
