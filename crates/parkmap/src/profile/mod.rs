//! User profiles created on first sign-in. Identity verification belongs to the auth provider;
//! this module only keeps the profile document and its one editable field.

pub mod router;
pub mod service;

pub use router::profile_router;
pub use service::{
    EnsuredProfile, ProfileError, ProfileService, ProfileStore, ProfileStoreError, SignInIdentity,
    UserProfile,
};
