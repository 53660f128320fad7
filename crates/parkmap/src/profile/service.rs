use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Profile document keyed by the identity provider's uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub address: String,
}

/// What the auth provider tells us about a freshly verified user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInIdentity {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub email: String,
}

/// Storage abstraction for profile documents.
pub trait ProfileStore: Send + Sync {
    fn insert(&self, profile: UserProfile) -> Result<UserProfile, ProfileStoreError>;
    fn update(&self, profile: UserProfile) -> Result<(), ProfileStoreError>;
    fn fetch(&self, uid: &str) -> Result<Option<UserProfile>, ProfileStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("profile already exists")]
    Conflict,
    #[error("profile not found")]
    NotFound,
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("no profile for user '{uid}'")]
    NotFound { uid: String },
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),
    #[error(transparent)]
    Store(#[from] ProfileStoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredProfile {
    pub profile: UserProfile,
    pub created: bool,
}

pub struct ProfileService<S> {
    store: Arc<S>,
}

impl<S> ProfileService<S>
where
    S: ProfileStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Return the stored profile, creating `{displayName, email, address: ""}` on first sign-in.
    pub fn ensure_profile(&self, identity: SignInIdentity) -> Result<EnsuredProfile, ProfileError> {
        let uid = identity.uid.trim();
        if uid.is_empty() {
            return Err(ProfileError::InvalidIdentity("uid must not be empty".to_string()));
        }

        if let Some(profile) = self.store.fetch(uid)? {
            return Ok(EnsuredProfile {
                profile,
                created: false,
            });
        }

        let fresh = UserProfile {
            uid: uid.to_string(),
            display_name: identity.display_name.unwrap_or_default(),
            email: identity.email,
            address: String::new(),
        };

        match self.store.insert(fresh) {
            Ok(profile) => {
                info!(uid = %profile.uid, "created profile on first sign-in");
                Ok(EnsuredProfile {
                    profile,
                    created: true,
                })
            }
            // a concurrent sign-in got there first
            Err(ProfileStoreError::Conflict) => {
                let profile = self.store.fetch(uid)?.ok_or(ProfileStoreError::NotFound)?;
                Ok(EnsuredProfile {
                    profile,
                    created: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn get(&self, uid: &str) -> Result<UserProfile, ProfileError> {
        self.store
            .fetch(uid)?
            .ok_or_else(|| ProfileError::NotFound {
                uid: uid.to_string(),
            })
    }

    /// Address is the only field users may edit.
    pub fn update_address(&self, uid: &str, address: &str) -> Result<UserProfile, ProfileError> {
        let mut profile = self.get(uid)?;
        profile.address = address.trim().to_string();
        self.store.update(profile.clone())?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        profiles: Mutex<HashMap<String, UserProfile>>,
    }

    impl ProfileStore for MemoryStore {
        fn insert(&self, profile: UserProfile) -> Result<UserProfile, ProfileStoreError> {
            let mut guard = self.profiles.lock().expect("lock");
            if guard.contains_key(&profile.uid) {
                return Err(ProfileStoreError::Conflict);
            }
            guard.insert(profile.uid.clone(), profile.clone());
            Ok(profile)
        }

        fn update(&self, profile: UserProfile) -> Result<(), ProfileStoreError> {
            let mut guard = self.profiles.lock().expect("lock");
            match guard.get_mut(&profile.uid) {
                Some(existing) => {
                    *existing = profile;
                    Ok(())
                }
                None => Err(ProfileStoreError::NotFound),
            }
        }

        fn fetch(&self, uid: &str) -> Result<Option<UserProfile>, ProfileStoreError> {
            Ok(self.profiles.lock().expect("lock").get(uid).cloned())
        }
    }

    struct DownStore;

    impl ProfileStore for DownStore {
        fn insert(&self, _: UserProfile) -> Result<UserProfile, ProfileStoreError> {
            Err(ProfileStoreError::Unavailable("offline".to_string()))
        }

        fn update(&self, _: UserProfile) -> Result<(), ProfileStoreError> {
            Err(ProfileStoreError::Unavailable("offline".to_string()))
        }

        fn fetch(&self, _: &str) -> Result<Option<UserProfile>, ProfileStoreError> {
            Err(ProfileStoreError::Unavailable("offline".to_string()))
        }
    }

    fn identity() -> SignInIdentity {
        SignInIdentity {
            uid: "u-1".to_string(),
            display_name: None,
            email: "hanako@example.com".to_string(),
        }
    }

    #[test]
    fn first_sign_in_creates_profile_with_empty_address() {
        let service = ProfileService::new(Arc::new(MemoryStore::default()));

        let ensured = service.ensure_profile(identity()).expect("ensure");

        assert!(ensured.created);
        assert_eq!(ensured.profile.display_name, "");
        assert_eq!(ensured.profile.email, "hanako@example.com");
        assert_eq!(ensured.profile.address, "");
    }

    #[test]
    fn second_sign_in_returns_existing_profile() {
        let service = ProfileService::new(Arc::new(MemoryStore::default()));
        service.ensure_profile(identity()).expect("first");
        service.update_address("u-1", "Shibuya").expect("update");

        let ensured = service.ensure_profile(identity()).expect("second");

        assert!(!ensured.created);
        assert_eq!(ensured.profile.address, "Shibuya");
    }

    #[test]
    fn update_address_requires_existing_profile() {
        let service = ProfileService::new(Arc::new(MemoryStore::default()));
        match service.update_address("ghost", "Nowhere") {
            Err(ProfileError::NotFound { uid }) => assert_eq!(uid, "ghost"),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn blank_uid_is_rejected() {
        let service = ProfileService::new(Arc::new(MemoryStore::default()));
        let mut blank = identity();
        blank.uid = "  ".to_string();
        assert!(matches!(
            service.ensure_profile(blank),
            Err(ProfileError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn store_failures_propagate() {
        let service = ProfileService::new(Arc::new(DownStore));
        assert!(matches!(
            service.ensure_profile(identity()),
            Err(ProfileError::Store(ProfileStoreError::Unavailable(_)))
        ));
    }
}
