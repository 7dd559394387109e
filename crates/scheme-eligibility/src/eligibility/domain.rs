use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rules::Ruleset;

/// Identifier wrapper for citizen profiles.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier wrapper for schemes in the catalog.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SchemeId(pub String);

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Account role; administrators are never matched against schemes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileRole {
    #[default]
    Student,
    NormalUser,
    Admin,
}

/// Attributes a ruleset can be evaluated against.
///
/// `None` means the attribute was never supplied and fails any condition on it. For text
/// attributes `Some(String::new())` is a supplied-but-empty value and still takes part in
/// comparisons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: ProfileId,
    #[serde(default)]
    pub role: ProfileRole,
    pub annual_income: Option<f64>,
    pub date_of_birth: Option<String>,
    /// Explicit age; wins over the value derived from `date_of_birth`.
    pub age: Option<u32>,
    pub category: Option<String>,
    pub state: Option<String>,
    pub education_level: Option<String>,
    pub gender: Option<String>,
    pub minority_status: Option<String>,
    pub disability_status: Option<String>,
    pub institution_type: Option<String>,
    pub marks_percentage: Option<f64>,
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ProfileId(id.into()),
            ..Self::default()
        }
    }

    pub fn is_matchable(&self) -> bool {
        self.role != ProfileRole::Admin
    }
}

/// Publication lifecycle of a scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemeStatus {
    #[default]
    Draft,
    Published,
    Paused,
    Expired,
}

/// Catalog entry pairing scheme metadata with its eligibility ruleset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub id: SchemeId,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default = "default_scheme_type")]
    pub scheme_type: String,
    #[serde(default)]
    pub description: Option<String>,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub status: SchemeStatus,
    #[serde(default)]
    pub conditions: Ruleset,
    #[serde(default)]
    pub matched_profiles: Vec<ProfileId>,
    #[serde(default)]
    pub total_matches: usize,
}

fn default_scheme_type() -> String {
    "Scholarship".to_string()
}

impl Scheme {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        deadline: NaiveDate,
        conditions: Ruleset,
    ) -> Self {
        Self {
            id: SchemeId(id.into()),
            name: name.into(),
            department: String::new(),
            scheme_type: default_scheme_type(),
            description: None,
            deadline,
            status: SchemeStatus::Draft,
            conditions,
            matched_profiles: Vec::new(),
            total_matches: 0,
        }
    }

    /// Published and still accepting applications on `today`.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.status == SchemeStatus::Published && self.deadline >= today
    }
}
