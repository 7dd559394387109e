//! Scheme eligibility: typed rule conditions, group composition, partial-credit scoring,
//! and population matching in both directions (one scheme against many profiles, one
//! profile against many schemes).
//!
//! Evaluation is pure and fail-closed. Anything the engine cannot interpret, whether an
//! unrecognized field, an unparseable rule value, or a missing profile attribute, counts
//! as an unmet condition rather than an error.

pub mod catalog;
mod clock;
pub mod domain;
pub(crate) mod evaluation;
pub(crate) mod matching;
pub(crate) mod operators;
pub mod repository;
pub(crate) mod resolver;
pub mod router;
pub mod rules;
pub(crate) mod scoring;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, CatalogLoad, RejectedRecord};
pub use clock::EvaluationClock;
pub use domain::{Profile, ProfileId, ProfileRole, Scheme, SchemeId, SchemeStatus};
pub use evaluation::{
    check_condition, evaluate_group, ConditionFailure, ConditionOutcome, FailClosed,
    GroupEvaluation,
};
pub use matching::{PopulationMatch, PopulationMatcher, SchemeEligibility, SchemeResults};
pub use operators::Comparison;
pub use repository::{ProfileStore, SchemeStore, StoreError};
pub use resolver::{age_on, parse_date_of_birth, resolve, ResolvedValue};
pub use router::eligibility_router;
pub use rules::{
    Condition, ConditionGroup, FieldName, Joiner, Operator, RuleValue, Ruleset, Term, Vocabulary,
};
pub use scoring::{
    Assessment, ClassificationPolicy, EligibilityBand, EligibilityResult, EligibilityScorer,
    PARTIAL_MATCH_THRESHOLD,
};
pub use service::{
    Dashboard, DashboardScheme, EligibilityCheck, MatchingServiceError, PublishOutcome,
    SchemeMatches, SchemeMatchingService, UpcomingDeadline,
};
pub use validation::{IssueKind, IssueSeverity, RulesetIssue};
