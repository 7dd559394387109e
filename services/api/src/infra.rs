use crate::cli::CatalogArgs;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use scheme_eligibility::eligibility::catalog::{
    load_profiles_from_path, load_schemes_from_path, CatalogLoad,
};
use scheme_eligibility::eligibility::{
    Profile, ProfileId, ProfileStore, Scheme, SchemeId, SchemeStore, StoreError,
};
use scheme_eligibility::error::AppError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable(format!("{store} lock poisoned")))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    records: Arc<Mutex<BTreeMap<ProfileId, Profile>>>,
}

impl InMemoryProfileStore {
    pub(crate) fn from_records(profiles: Vec<Profile>) -> Self {
        let records = profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        let guard = lock(&self.records, "profile store")?;
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<Profile>, StoreError> {
        let guard = lock(&self.records, "profile store")?;
        Ok(guard.values().cloned().collect())
    }
}

/// Schemes in catalog order; results pages list them in this order.
#[derive(Default, Clone)]
pub(crate) struct InMemorySchemeStore {
    records: Arc<Mutex<Vec<Scheme>>>,
}

impl InMemorySchemeStore {
    pub(crate) fn from_records(schemes: Vec<Scheme>) -> Self {
        Self {
            records: Arc::new(Mutex::new(schemes)),
        }
    }
}

impl SchemeStore for InMemorySchemeStore {
    fn fetch(&self, id: &SchemeId) -> Result<Option<Scheme>, StoreError> {
        let guard = lock(&self.records, "scheme store")?;
        Ok(guard.iter().find(|scheme| &scheme.id == id).cloned())
    }

    fn all(&self) -> Result<Vec<Scheme>, StoreError> {
        let guard = lock(&self.records, "scheme store")?;
        Ok(guard.clone())
    }

    fn update(&self, scheme: Scheme) -> Result<(), StoreError> {
        let mut guard = lock(&self.records, "scheme store")?;
        let existing = guard
            .iter_mut()
            .find(|existing| existing.id == scheme.id)
            .ok_or(StoreError::NotFound)?;
        *existing = scheme;
        Ok(())
    }
}

/// Builds both stores from the configured exports; a missing path yields an empty store.
pub(crate) fn seed_stores(
    catalog: &CatalogArgs,
) -> Result<(InMemoryProfileStore, InMemorySchemeStore), AppError> {
    let profiles = match catalog.profiles.as_deref() {
        Some(path) => accepted(path, load_profiles_from_path(path)?),
        None => Vec::new(),
    };
    let schemes = match catalog.schemes.as_deref() {
        Some(path) => accepted(path, load_schemes_from_path(path)?),
        None => Vec::new(),
    };

    info!(
        profiles = profiles.len(),
        schemes = schemes.len(),
        "seeded in-memory stores"
    );

    Ok((
        InMemoryProfileStore::from_records(profiles),
        InMemorySchemeStore::from_records(schemes),
    ))
}

fn accepted<T>(path: &Path, load: CatalogLoad<T>) -> Vec<T> {
    for rejected in &load.rejected {
        warn!(
            path = %path.display(),
            index = rejected.index,
            reason = %rejected.reason,
            "skipping malformed catalog record"
        );
    }
    load.records
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
