use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::Profile;
use super::evaluation::evaluate_group;
use super::rules::Ruleset;

/// Scores strictly above this are a partial match.
pub const PARTIAL_MATCH_THRESHOLD: u8 = 50;

/// Verdict of one profile against one ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub score: u8,
    pub missing: Vec<String>,
}

impl EligibilityResult {
    /// Outcome for a ruleset with no groups.
    pub fn universal() -> Self {
        Self {
            is_eligible: true,
            score: 100,
            missing: Vec::new(),
        }
    }
}

/// [`EligibilityResult`] plus the counts it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub result: EligibilityResult,
    pub matched_groups: usize,
    pub total_groups: usize,
    /// Failing conditions that could not be compared at all.
    pub fail_closed_conditions: usize,
}

impl Assessment {
    pub fn is_degraded(&self) -> bool {
        self.fail_closed_conditions > 0
    }
}

/// Stateless scorer pinned to an evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityScorer {
    today: NaiveDate,
}

impl EligibilityScorer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn score(&self, profile: &Profile, ruleset: &Ruleset) -> EligibilityResult {
        self.assess(profile, ruleset).result
    }

    pub fn assess(&self, profile: &Profile, ruleset: &Ruleset) -> Assessment {
        if ruleset.is_empty() {
            return Assessment {
                result: EligibilityResult::universal(),
                matched_groups: 0,
                total_groups: 0,
                fail_closed_conditions: 0,
            };
        }

        let mut matched_groups = 0;
        let mut fail_closed_conditions = 0;
        let mut seen = HashSet::new();
        let mut missing = Vec::new();

        for group in ruleset.groups() {
            let evaluation = evaluate_group(profile, group, self.today);
            if evaluation.passed {
                matched_groups += 1;
                continue;
            }

            for failure in &evaluation.failed_conditions {
                if failure.failed_closed() {
                    fail_closed_conditions += 1;
                }
                let requirement = failure.condition.describe();
                if seen.insert(requirement.clone()) {
                    missing.push(requirement);
                }
            }
        }

        let total_groups = ruleset.len();

        Assessment {
            result: EligibilityResult {
                is_eligible: matched_groups == total_groups,
                score: rounded_percentage(matched_groups, total_groups),
                missing,
            },
            matched_groups,
            total_groups,
            fail_closed_conditions,
        }
    }
}

// Half-up rounding of 100 * matched / total in integer arithmetic.
fn rounded_percentage(matched: usize, total: usize) -> u8 {
    let percentage = (200 * matched + total) / (2 * total);
    u8::try_from(percentage.min(100)).unwrap_or(100)
}

/// Classification band shown to applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityBand {
    Eligible,
    Partial,
    NotEligible,
}

impl EligibilityBand {
    pub const fn reason(self) -> &'static str {
        match self {
            EligibilityBand::Eligible => "You meet all eligibility criteria",
            EligibilityBand::Partial => "You partially meet the eligibility criteria",
            EligibilityBand::NotEligible => "You do not meet the eligibility criteria",
        }
    }
}

/// Maps a score onto a band using the partial-match threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationPolicy {
    partial_threshold: u8,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::new(PARTIAL_MATCH_THRESHOLD)
    }
}

impl ClassificationPolicy {
    pub const fn new(partial_threshold: u8) -> Self {
        Self { partial_threshold }
    }

    pub const fn partial_threshold(self) -> u8 {
        self.partial_threshold
    }

    pub fn classify(&self, result: &EligibilityResult) -> EligibilityBand {
        if result.is_eligible || result.score == 100 {
            EligibilityBand::Eligible
        } else if result.score > self.partial_threshold {
            EligibilityBand::Partial
        } else {
            EligibilityBand::NotEligible
        }
    }
}
