use super::evaluation::FailClosed;
use super::resolver::{parse_number, ResolvedValue};
use super::rules::Operator;

/// Operator paired with its rule value, parsed into the shape the operator needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Equals(String),
    NotEquals(String),
    LessThan(f64),
    GreaterThan(f64),
    Between { min: f64, max: f64 },
    Includes(String),
}

impl Comparison {
    pub fn parse(operator: Operator, raw: &str) -> Result<Self, FailClosed> {
        match operator {
            Operator::Equals => Ok(Comparison::Equals(raw.to_lowercase())),
            Operator::NotEquals => Ok(Comparison::NotEquals(raw.to_lowercase())),
            Operator::LessThan => Ok(Comparison::LessThan(number_target(raw)?)),
            Operator::GreaterThan => Ok(Comparison::GreaterThan(number_target(raw)?)),
            Operator::Between => {
                let (min, max) = range_target(raw)?;
                Ok(Comparison::Between { min, max })
            }
            Operator::Includes => Ok(Comparison::Includes(raw.to_lowercase())),
        }
    }

    pub fn test(&self, value: &ResolvedValue) -> Result<bool, FailClosed> {
        match self {
            Comparison::Equals(target) => Ok(lowered(value) == *target),
            Comparison::NotEquals(target) => Ok(lowered(value) != *target),
            Comparison::LessThan(target) => Ok(numeric(value)? < *target),
            Comparison::GreaterThan(target) => Ok(numeric(value)? > *target),
            Comparison::Between { min, max } => {
                let value = numeric(value)?;
                Ok(*min <= value && value <= *max)
            }
            Comparison::Includes(target) => Ok(lowered(value).contains(target.as_str())),
        }
    }
}

/// Applies `operator` with the raw rule value to a resolved profile value.
pub(crate) fn evaluate(
    value: &ResolvedValue,
    operator: Operator,
    raw: &str,
) -> Result<bool, FailClosed> {
    Comparison::parse(operator, raw)?.test(value)
}

fn lowered(value: &ResolvedValue) -> String {
    value.to_string().to_lowercase()
}

fn numeric(value: &ResolvedValue) -> Result<f64, FailClosed> {
    value
        .numeric()
        .ok_or_else(|| FailClosed::NonNumericValue(value.to_string()))
}

fn number_target(raw: &str) -> Result<f64, FailClosed> {
    parse_number(raw).ok_or_else(|| FailClosed::NonNumericTarget(raw.to_string()))
}

fn range_target(raw: &str) -> Result<(f64, f64), FailClosed> {
    let malformed = || FailClosed::MalformedRange(raw.to_string());
    let mut parts = raw.split('-');
    let (Some(min), Some(max), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let min = parse_number(min).ok_or_else(malformed)?;
    let max = parse_number(max).ok_or_else(malformed)?;
    Ok((min, max))
}
