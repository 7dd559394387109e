use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::Profile;
use super::operators;
use super::resolver::resolve;
use super::rules::{Condition, ConditionGroup, FieldName, Joiner, RuleValue, Term, Vocabulary};

/// Why a condition was treated as unmet without being compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailClosed {
    UnrecognizedField(String),
    UnrecognizedOperator(String),
    UnrecognizedJoiner(String),
    MissingAttribute(String),
    NonNumericTarget(String),
    NonNumericValue(String),
    MalformedRange(String),
    UnsupportedValue(String),
}

impl FailClosed {
    fn missing(field: FieldName) -> Self {
        FailClosed::MissingAttribute(field.label().to_string())
    }
}

impl fmt::Display for FailClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailClosed::UnrecognizedField(raw) => write!(f, "unrecognized field '{raw}'"),
            FailClosed::UnrecognizedOperator(raw) => write!(f, "unrecognized operator '{raw}'"),
            FailClosed::UnrecognizedJoiner(raw) => write!(f, "unrecognized joiner '{raw}'"),
            FailClosed::MissingAttribute(field) => write!(f, "profile has no value for {field}"),
            FailClosed::NonNumericTarget(raw) => write!(f, "rule value '{raw}' is not a number"),
            FailClosed::NonNumericValue(raw) => write!(f, "profile value '{raw}' is not a number"),
            FailClosed::MalformedRange(raw) => {
                write!(f, "rule value '{raw}' is not a 'min-max' range")
            }
            FailClosed::UnsupportedValue(raw) => {
                write!(f, "rule value {raw} is neither text nor a number")
            }
        }
    }
}

/// Result of checking one condition against one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOutcome {
    Satisfied,
    Unsatisfied,
    FailedClosed(FailClosed),
}

impl ConditionOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, ConditionOutcome::Satisfied)
    }
}

/// Every condition goes through here: unrecognized terms, absent attributes, and
/// unparseable values all come back as [`ConditionOutcome::FailedClosed`].
pub fn check_condition(
    profile: &Profile,
    condition: &Condition,
    today: NaiveDate,
) -> ConditionOutcome {
    let field = match &condition.field {
        Term::Known(field) => *field,
        Term::Unrecognized(raw) => {
            return ConditionOutcome::FailedClosed(FailClosed::UnrecognizedField(raw.clone()))
        }
    };
    let operator = match &condition.operator {
        Term::Known(operator) => *operator,
        Term::Unrecognized(raw) => {
            return ConditionOutcome::FailedClosed(FailClosed::UnrecognizedOperator(raw.clone()))
        }
    };
    let target = match &condition.value {
        RuleValue::Text(text) => text,
        RuleValue::Unsupported(raw) => {
            return ConditionOutcome::FailedClosed(FailClosed::UnsupportedValue(raw.clone()))
        }
    };
    let Some(value) = resolve(profile, field, today) else {
        return ConditionOutcome::FailedClosed(FailClosed::missing(field));
    };

    match operators::evaluate(&value, operator, target) {
        Ok(true) => ConditionOutcome::Satisfied,
        Ok(false) => ConditionOutcome::Unsatisfied,
        Err(reason) => ConditionOutcome::FailedClosed(reason),
    }
}

/// A condition that did not hold, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionFailure<'a> {
    pub condition: &'a Condition,
    pub outcome: ConditionOutcome,
}

impl ConditionFailure<'_> {
    pub fn failed_closed(&self) -> bool {
        matches!(self.outcome, ConditionOutcome::FailedClosed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupEvaluation<'a> {
    pub passed: bool,
    pub failed_conditions: Vec<ConditionFailure<'a>>,
}

/// Evaluates one group. Failures are only reported when the group fails: every unmet
/// row for AND, every row for OR. An empty group passes.
pub fn evaluate_group<'a>(
    profile: &Profile,
    group: &'a ConditionGroup,
    today: NaiveDate,
) -> GroupEvaluation<'a> {
    let joiner = match &group.joiner {
        Term::Known(joiner) => *joiner,
        Term::Unrecognized(raw) => {
            let failed_conditions = group
                .rows
                .iter()
                .map(|condition| ConditionFailure {
                    condition,
                    outcome: ConditionOutcome::FailedClosed(FailClosed::UnrecognizedJoiner(
                        raw.clone(),
                    )),
                })
                .collect();
            return GroupEvaluation {
                passed: false,
                failed_conditions,
            };
        }
    };

    let failures: Vec<ConditionFailure<'a>> = group
        .rows
        .iter()
        .filter_map(|condition| {
            let outcome = check_condition(profile, condition, today);
            (!outcome.is_satisfied()).then_some(ConditionFailure { condition, outcome })
        })
        .collect();

    let passed = match joiner {
        Joiner::And => failures.is_empty(),
        Joiner::Or => group.rows.is_empty() || failures.len() < group.rows.len(),
    };

    GroupEvaluation {
        passed,
        failed_conditions: if passed { Vec::new() } else { failures },
    }
}
