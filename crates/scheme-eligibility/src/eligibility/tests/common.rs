use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::MatchingConfig;
use crate::eligibility::domain::{Profile, ProfileId, ProfileRole, Scheme, SchemeId};
use crate::eligibility::repository::{ProfileStore, SchemeStore, StoreError};
use crate::eligibility::rules::{Condition, ConditionGroup, FieldName, Operator, Ruleset};
use crate::eligibility::scoring::EligibilityScorer;
use crate::eligibility::service::SchemeMatchingService;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn scorer() -> EligibilityScorer {
    EligibilityScorer::new(today())
}

pub(super) fn row(field: FieldName, operator: Operator, value: &str) -> Condition {
    Condition::new(field, operator, value)
}

pub(super) fn ruleset(groups: Vec<ConditionGroup>) -> Ruleset {
    Ruleset::new(groups)
}

/// OBC undergraduate from Maharashtra, aged 19 on [`today`].
pub(super) fn student(id: &str) -> Profile {
    Profile {
        id: ProfileId(id.to_string()),
        role: ProfileRole::Student,
        annual_income: Some(200_000.0),
        date_of_birth: Some("2005-01-01".to_string()),
        age: None,
        category: Some("OBC".to_string()),
        state: Some("Maharashtra".to_string()),
        education_level: Some("UG".to_string()),
        gender: Some("Female".to_string()),
        minority_status: Some("No".to_string()),
        disability_status: Some("No Disability".to_string()),
        institution_type: Some("Government".to_string()),
        marks_percentage: Some(82.5),
    }
}

pub(super) fn with_income(id: &str, income: f64) -> Profile {
    Profile {
        annual_income: Some(income),
        ..student(id)
    }
}

pub(super) fn low_income_obc_rules() -> Ruleset {
    ruleset(vec![ConditionGroup::all(vec![
        row(FieldName::AnnualIncome, Operator::LessThan, "800000"),
        row(FieldName::Category, Operator::Equals, "OBC"),
    ])])
}

pub(super) fn scheme(id: &str, deadline: NaiveDate, conditions: Ruleset) -> Scheme {
    Scheme::new(id, format!("Scheme {id}"), deadline, conditions)
}

pub(super) fn matching_config() -> MatchingConfig {
    MatchingConfig {
        partial_threshold: 50,
        clock_date: Some(today()),
        deadline_window_days: 7,
    }
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    records: Mutex<BTreeMap<ProfileId, Profile>>,
}

impl MemoryProfiles {
    pub(super) fn with(profiles: Vec<Profile>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("profile mutex poisoned");
            for profile in profiles {
                guard.insert(profile.id.clone(), profile);
            }
        }
        store
    }
}

impl ProfileStore for MemoryProfiles {
    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        let guard = self.records.lock().expect("profile mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<Profile>, StoreError> {
        let guard = self.records.lock().expect("profile mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default)]
pub(super) struct MemorySchemes {
    records: Mutex<Vec<Scheme>>,
}

impl MemorySchemes {
    pub(super) fn with(schemes: Vec<Scheme>) -> Self {
        Self {
            records: Mutex::new(schemes),
        }
    }

    pub(super) fn get(&self, id: &str) -> Option<Scheme> {
        let guard = self.records.lock().expect("scheme mutex poisoned");
        guard.iter().find(|scheme| scheme.id.0 == id).cloned()
    }
}

impl SchemeStore for MemorySchemes {
    fn fetch(&self, id: &SchemeId) -> Result<Option<Scheme>, StoreError> {
        let guard = self.records.lock().expect("scheme mutex poisoned");
        Ok(guard.iter().find(|scheme| &scheme.id == id).cloned())
    }

    fn all(&self) -> Result<Vec<Scheme>, StoreError> {
        let guard = self.records.lock().expect("scheme mutex poisoned");
        Ok(guard.clone())
    }

    fn update(&self, scheme: Scheme) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("scheme mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == scheme.id) {
            Some(existing) => {
                *existing = scheme;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}

pub(super) struct UnavailableProfiles;

impl ProfileStore for UnavailableProfiles {
    fn fetch(&self, _id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Profile>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) type TestService = SchemeMatchingService<MemoryProfiles, MemorySchemes>;

pub(super) fn build_service(
    profiles: Vec<Profile>,
    schemes: Vec<Scheme>,
) -> (TestService, Arc<MemorySchemes>) {
    let profile_store = Arc::new(MemoryProfiles::with(profiles));
    let scheme_store = Arc::new(MemorySchemes::with(schemes));
    let service =
        SchemeMatchingService::new(profile_store, scheme_store.clone(), &matching_config());
    (service, scheme_store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
