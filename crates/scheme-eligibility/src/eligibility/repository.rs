use super::domain::{Profile, ProfileId, Scheme, SchemeId};

/// Read access to the profile population.
pub trait ProfileStore: Send + Sync {
    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError>;
    fn all(&self) -> Result<Vec<Profile>, StoreError>;
}

/// Scheme catalog; `update` persists publish-time match results.
pub trait SchemeStore: Send + Sync {
    fn fetch(&self, id: &SchemeId) -> Result<Option<Scheme>, StoreError>;
    fn all(&self) -> Result<Vec<Scheme>, StoreError>;
    fn update(&self, scheme: Scheme) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
