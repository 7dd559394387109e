use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate};

use super::domain::Profile;
use super::rules::FieldName;

/// Typed value read off a profile for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Number(f64),
    Text(String),
}

impl ResolvedValue {
    /// Numeric view; text only qualifies when it parses as a finite number.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(value) => Some(*value),
            ResolvedValue::Text(text) => parse_number(text),
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Number(value) => write!(f, "{value}"),
            ResolvedValue::Text(text) => f.write_str(text),
        }
    }
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Reads `field` off `profile`; `None` when the profile never supplied the attribute.
pub fn resolve(profile: &Profile, field: FieldName, today: NaiveDate) -> Option<ResolvedValue> {
    match field {
        FieldName::AnnualIncome => profile.annual_income.map(ResolvedValue::Number),
        FieldName::Age => age_of(profile, today).map(|age| ResolvedValue::Number(f64::from(age))),
        FieldName::Category => text(&profile.category),
        FieldName::State => text(&profile.state),
        FieldName::EducationLevel => text(&profile.education_level),
        FieldName::Gender => text(&profile.gender),
        FieldName::MinorityStatus => text(&profile.minority_status),
        FieldName::DisabilityStatus => text(&profile.disability_status),
        FieldName::InstitutionType => text(&profile.institution_type),
        FieldName::MarksPercentage => profile.marks_percentage.map(ResolvedValue::Number),
    }
}

fn text(value: &Option<String>) -> Option<ResolvedValue> {
    value.as_ref().map(|text| ResolvedValue::Text(text.clone()))
}

fn age_of(profile: &Profile, today: NaiveDate) -> Option<i32> {
    if let Some(age) = profile.age {
        return i32::try_from(age).ok();
    }
    let date_of_birth = parse_date_of_birth(profile.date_of_birth.as_deref()?)?;
    Some(age_on(date_of_birth, today))
}

/// Whole years between `date_of_birth` and `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years - 1
    } else {
        years
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; blank input is treated as absent.
pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}
