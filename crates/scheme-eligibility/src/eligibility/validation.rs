use std::fmt;

use serde::Serialize;

use super::evaluation::FailClosed;
use super::operators::Comparison;
use super::rules::{
    Condition, ConditionGroup, FieldName, Operator, RuleValue, Ruleset, Term, Vocabulary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// The rule can never be satisfied as written.
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    EmptyGroup,
    UnrecognizedJoiner { joiner: String },
    UnrecognizedField { field: String },
    UnrecognizedOperator { operator: String },
    NonNumericValue { value: String },
    MalformedRange { value: String },
    UnsupportedValue { value: String },
    UnlistedValue { field: String, value: String },
}

/// Authoring problem found in a ruleset, located by group and row index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesetIssue {
    pub group: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub severity: IssueSeverity,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl RulesetIssue {
    fn error(group: usize, row: Option<usize>, kind: IssueKind) -> Self {
        Self {
            group,
            row,
            severity: IssueSeverity::Error,
            kind,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for RulesetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}", self.group + 1)?;
        if let Some(row) = self.row {
            write!(f, ", row {}", row + 1)?;
        }
        f.write_str(": ")?;
        match &self.kind {
            IssueKind::EmptyGroup => f.write_str("group has no conditions"),
            IssueKind::UnrecognizedJoiner { joiner } => {
                write!(f, "joiner '{joiner}' must be AND or OR")
            }
            IssueKind::UnrecognizedField { field } => write!(f, "unknown field '{field}'"),
            IssueKind::UnrecognizedOperator { operator } => {
                write!(f, "unknown operator '{operator}'")
            }
            IssueKind::NonNumericValue { value } => {
                write!(f, "value '{value}' must be a number")
            }
            IssueKind::MalformedRange { value } => {
                write!(f, "value '{value}' must look like 'min-max'")
            }
            IssueKind::UnsupportedValue { value } => {
                write!(f, "value {value} must be text or a number")
            }
            IssueKind::UnlistedValue { field, value } => {
                write!(f, "'{value}' is not a listed option for {field}")
            }
        }
    }
}

impl Ruleset {
    /// Lists authoring problems. Evaluation never consults this; a ruleset with errors
    /// still evaluates, failing closed on the offending rows.
    pub fn validate(&self) -> Vec<RulesetIssue> {
        self.groups()
            .iter()
            .enumerate()
            .flat_map(|(index, group)| validate_group(index, group))
            .collect()
    }
}

fn validate_group(index: usize, group: &ConditionGroup) -> Vec<RulesetIssue> {
    let mut issues = Vec::new();

    if let Term::Unrecognized(joiner) = &group.joiner {
        issues.push(RulesetIssue::error(
            index,
            None,
            IssueKind::UnrecognizedJoiner {
                joiner: joiner.clone(),
            },
        ));
    }
    if group.rows.is_empty() {
        issues.push(RulesetIssue::error(index, None, IssueKind::EmptyGroup));
    }

    for (row, condition) in group.rows.iter().enumerate() {
        issues.extend(validate_condition(index, row, condition));
    }

    issues
}

fn validate_condition(group: usize, row: usize, condition: &Condition) -> Vec<RulesetIssue> {
    let mut issues = Vec::new();
    let field = condition.field.known();
    let operator = condition.operator.known();

    if field.is_none() {
        issues.push(RulesetIssue::error(
            group,
            Some(row),
            IssueKind::UnrecognizedField {
                field: condition.field.as_str().to_string(),
            },
        ));
    }

    let Some(operator) = operator else {
        issues.push(RulesetIssue::error(
            group,
            Some(row),
            IssueKind::UnrecognizedOperator {
                operator: condition.operator.as_str().to_string(),
            },
        ));
        return issues;
    };

    let value = match &condition.value {
        RuleValue::Text(text) => text,
        RuleValue::Unsupported(raw) => {
            issues.push(RulesetIssue::error(
                group,
                Some(row),
                IssueKind::UnsupportedValue { value: raw.clone() },
            ));
            return issues;
        }
    };

    match Comparison::parse(operator, value) {
        Err(FailClosed::MalformedRange(value)) => issues.push(RulesetIssue::error(
            group,
            Some(row),
            IssueKind::MalformedRange { value },
        )),
        Err(FailClosed::NonNumericTarget(value)) => issues.push(RulesetIssue::error(
            group,
            Some(row),
            IssueKind::NonNumericValue { value },
        )),
        Err(_) | Ok(_) => {}
    }

    if let Some(field) = field {
        if let Some(issue) = unlisted_value(group, row, field, operator, value) {
            issues.push(issue);
        }
    }

    issues
}

fn unlisted_value(
    group: usize,
    row: usize,
    field: FieldName,
    operator: Operator,
    value: &str,
) -> Option<RulesetIssue> {
    if !matches!(operator, Operator::Equals | Operator::NotEquals) {
        return None;
    }
    let listed = field.listed_values();
    if listed.is_empty()
        || listed
            .iter()
            .any(|option| option.eq_ignore_ascii_case(value.trim()))
    {
        return None;
    }

    Some(RulesetIssue {
        group,
        row: Some(row),
        severity: IssueSeverity::Warning,
        kind: IssueKind::UnlistedValue {
            field: field.label().to_string(),
            value: value.to_string(),
        },
    })
}

