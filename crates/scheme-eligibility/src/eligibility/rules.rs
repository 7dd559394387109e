use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Closed set of terms that rule text is parsed into.
pub trait Vocabulary: Copy + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.iter().copied().find(|term| term.label() == raw)
    }
}

/// Profile attributes a condition can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    AnnualIncome,
    Age,
    Category,
    State,
    EducationLevel,
    Gender,
    MinorityStatus,
    DisabilityStatus,
    InstitutionType,
    MarksPercentage,
}

impl Vocabulary for FieldName {
    const ALL: &'static [Self] = &[
        FieldName::AnnualIncome,
        FieldName::Age,
        FieldName::Category,
        FieldName::State,
        FieldName::EducationLevel,
        FieldName::Gender,
        FieldName::MinorityStatus,
        FieldName::DisabilityStatus,
        FieldName::InstitutionType,
        FieldName::MarksPercentage,
    ];

    fn label(self) -> &'static str {
        match self {
            FieldName::AnnualIncome => "Annual Income",
            FieldName::Age => "Age",
            FieldName::Category => "Category",
            FieldName::State => "State",
            FieldName::EducationLevel => "Education Level",
            FieldName::Gender => "Gender",
            FieldName::MinorityStatus => "Minority Status",
            FieldName::DisabilityStatus => "Disability Status",
            FieldName::InstitutionType => "Institution Type",
            FieldName::MarksPercentage => "Marks Percentage",
        }
    }
}

impl FieldName {
    /// Values offered to scheme authors for enumerated fields; empty for open fields.
    pub const fn listed_values(self) -> &'static [&'static str] {
        match self {
            FieldName::Category => &["General", "OBC", "SC", "ST"],
            FieldName::EducationLevel => &["10th", "12th", "Diploma", "UG", "PG"],
            FieldName::Gender => &["Male", "Female", "Other"],
            FieldName::MinorityStatus => &["Yes", "No"],
            FieldName::DisabilityStatus => {
                &["No Disability", "Physical", "Visual", "Hearing", "Other"]
            }
            FieldName::InstitutionType => &["Government", "Private"],
            FieldName::AnnualIncome
            | FieldName::Age
            | FieldName::State
            | FieldName::MarksPercentage => &[],
        }
    }
}

/// Comparison applied between a profile value and the rule value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    Between,
    Includes,
}

impl Vocabulary for Operator {
    const ALL: &'static [Self] = &[
        Operator::Equals,
        Operator::NotEquals,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::Between,
        Operator::Includes,
    ];

    fn label(self) -> &'static str {
        match self {
            Operator::Equals => "Equals",
            Operator::NotEquals => "Not Equals",
            Operator::LessThan => "Less Than",
            Operator::GreaterThan => "Greater Than",
            Operator::Between => "Between",
            Operator::Includes => "Includes",
        }
    }
}

/// How the rows of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joiner {
    And,
    Or,
}

impl Vocabulary for Joiner {
    const ALL: &'static [Self] = &[Joiner::And, Joiner::Or];

    fn label(self) -> &'static str {
        match self {
            Joiner::And => "AND",
            Joiner::Or => "OR",
        }
    }
}

/// Rule text parsed against a [`Vocabulary`], keeping the raw text when it is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term<T> {
    Known(T),
    Unrecognized(String),
}

impl<T: Vocabulary> Term<T> {
    pub fn parse(raw: &str) -> Self {
        match T::parse(raw) {
            Some(term) => Term::Known(term),
            None => Term::Unrecognized(raw.to_string()),
        }
    }

    pub fn known(&self) -> Option<T> {
        match self {
            Term::Known(term) => Some(*term),
            Term::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Term::Known(term) => term.label(),
            Term::Unrecognized(raw) => raw,
        }
    }
}

impl<T: Vocabulary> fmt::Display for Term<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: Vocabulary> Serialize for Term<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, T: Vocabulary> Deserialize<'de> for Term<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Term::parse(&raw))
    }
}

/// A single `field operator value` comparison ("row").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: Term<FieldName>,
    pub operator: Term<Operator>,
    pub value: RuleValue,
}

impl Condition {
    pub fn new(field: FieldName, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: Term::Known(field),
            operator: Term::Known(operator),
            value: RuleValue::Text(value.into()),
        }
    }

    /// Human-readable form used in missing-requirement lists.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Rule value as stored. Scalars become text; arrays and objects are kept as their
/// compact JSON so the row still loads and fails closed when evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    Text(String),
    Unsupported(String),
}

impl RuleValue {
    pub fn as_str(&self) -> &str {
        match self {
            RuleValue::Text(text) | RuleValue::Unsupported(text) => text,
        }
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        RuleValue::Text(value.to_string())
    }
}

impl PartialEq<&str> for RuleValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, RuleValue::Text(text) if text == other)
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RuleValue::Text(text) => serializer.serialize_str(text),
            RuleValue::Unsupported(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(value) => value.serialize(serializer),
                Err(_) => serializer.serialize_str(raw),
            },
        }
    }
}

// Hand-written JSON often carries bare numbers; null reads as an empty value.
impl<'de> Deserialize<'de> for RuleValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(text) => RuleValue::Text(text),
            serde_json::Value::Number(number) => RuleValue::Text(number.to_string()),
            serde_json::Value::Bool(flag) => RuleValue::Text(flag.to_string()),
            serde_json::Value::Null => RuleValue::Text(String::new()),
            structured @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                RuleValue::Unsupported(structured.to_string())
            }
        })
    }
}

/// Conditions combined by a single joiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    #[serde(default = "default_joiner")]
    pub joiner: Term<Joiner>,
    #[serde(default)]
    pub rows: Vec<Condition>,
}

fn default_joiner() -> Term<Joiner> {
    Term::Known(Joiner::And)
}

impl ConditionGroup {
    pub fn all(rows: Vec<Condition>) -> Self {
        Self {
            joiner: Term::Known(Joiner::And),
            rows,
        }
    }

    pub fn any(rows: Vec<Condition>) -> Self {
        Self {
            joiner: Term::Known(Joiner::Or),
            rows,
        }
    }
}

/// Ordered condition groups of one scheme, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ruleset {
    pub groups: Vec<ConditionGroup>,
}

impl Ruleset {
    pub fn new(groups: Vec<ConditionGroup>) -> Self {
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[ConditionGroup] {
        &self.groups
    }
}

impl From<Vec<ConditionGroup>> for Ruleset {
    fn from(groups: Vec<ConditionGroup>) -> Self {
        Self::new(groups)
    }
}
