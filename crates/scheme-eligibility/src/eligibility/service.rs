use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::EvaluationClock;
use super::domain::{Profile, ProfileId, Scheme, SchemeId, SchemeStatus};
use super::matching::{PopulationMatcher, SchemeResults};
use super::repository::{ProfileStore, SchemeStore, StoreError};
use super::rules::Ruleset;
use super::scoring::{ClassificationPolicy, EligibilityBand, EligibilityResult, EligibilityScorer};
use super::validation::RulesetIssue;
use crate::config::MatchingConfig;

/// Service composing the stores with the population matcher.
pub struct SchemeMatchingService<P, S> {
    profiles: Arc<P>,
    schemes: Arc<S>,
    clock: EvaluationClock,
    policy: ClassificationPolicy,
    deadline_window_days: u32,
}

impl<P, S> SchemeMatchingService<P, S>
where
    P: ProfileStore + 'static,
    S: SchemeStore + 'static,
{
    pub fn new(profiles: Arc<P>, schemes: Arc<S>, config: &MatchingConfig) -> Self {
        Self {
            profiles,
            schemes,
            clock: config.clock(),
            policy: config.policy(),
            deadline_window_days: config.deadline_window_days,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn matcher(&self) -> PopulationMatcher {
        PopulationMatcher::new(EligibilityScorer::new(self.today()), self.policy)
    }

    /// Publish a scheme and record which profiles are fully eligible for it.
    pub fn publish(&self, scheme_id: &SchemeId) -> Result<PublishOutcome, MatchingServiceError> {
        let mut scheme = self.scheme(scheme_id)?;

        let (errors, warnings): (Vec<RulesetIssue>, Vec<RulesetIssue>) = scheme
            .conditions
            .validate()
            .into_iter()
            .partition(RulesetIssue::is_error);
        if !errors.is_empty() {
            warn!(%scheme_id, issues = errors.len(), "rejecting publish for invalid ruleset");
            return Err(MatchingServiceError::InvalidRuleset {
                scheme_id: scheme_id.clone(),
                issues: errors,
            });
        }
        for issue in &warnings {
            warn!(%scheme_id, %issue, "ruleset warning");
        }

        let population: Vec<Profile> = self
            .profiles
            .all()?
            .into_iter()
            .filter(Profile::is_matchable)
            .collect();
        let matched = self
            .matcher()
            .match_profiles(&scheme.conditions, &population);

        scheme.status = SchemeStatus::Published;
        scheme.matched_profiles = matched.matched.clone();
        scheme.total_matches = matched.count;
        self.schemes.update(scheme)?;

        info!(
            %scheme_id,
            evaluated = population.len(),
            matched = matched.count,
            degraded = matched.degraded,
            "scheme published"
        );

        Ok(PublishOutcome {
            scheme_id: scheme_id.clone(),
            status: SchemeStatus::Published,
            evaluated: population.len(),
            matched_profiles: matched.matched,
            total_matches: matched.count,
            degraded: matched.degraded,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        })
    }

    /// Matches recorded at the last publish.
    pub fn matches(&self, scheme_id: &SchemeId) -> Result<SchemeMatches, MatchingServiceError> {
        let scheme = self.scheme(scheme_id)?;
        Ok(SchemeMatches {
            scheme_id: scheme.id,
            status: scheme.status,
            matched_profiles: scheme.matched_profiles,
            total: scheme.total_matches,
        })
    }

    /// Classify every scheme in the catalog for one profile.
    pub fn results_for(
        &self,
        profile_id: &ProfileId,
    ) -> Result<SchemeResults, MatchingServiceError> {
        let profile = self.profile(profile_id)?;
        let schemes = self.schemes.all()?;
        let results = self.matcher().match_schemes(&profile, &schemes);

        if results.degraded_count > 0 {
            warn!(
                %profile_id,
                degraded = results.degraded_count,
                "some schemes could not be fully evaluated"
            );
        }
        debug!(
            %profile_id,
            eligible = results.eligible_count,
            partial = results.partial_count,
            not_eligible = results.not_eligible_count,
            "eligibility results computed"
        );

        Ok(results)
    }

    /// Active schemes the profile fully qualifies for, plus deadlines closing soon.
    pub fn dashboard(&self, profile_id: &ProfileId) -> Result<Dashboard, MatchingServiceError> {
        let profile = self.profile(profile_id)?;
        let today = self.today();
        let scorer = EligibilityScorer::new(today);

        let mut active: Vec<Scheme> = self
            .schemes
            .all()?
            .into_iter()
            .filter(|scheme| scheme.is_active(today))
            .collect();
        active.sort_by(|left, right| left.deadline.cmp(&right.deadline));

        let horizon = today
            .checked_add_signed(Duration::days(i64::from(self.deadline_window_days)))
            .unwrap_or(NaiveDate::MAX);
        let upcoming_deadlines = active
            .iter()
            .filter(|scheme| scheme.deadline <= horizon)
            .map(|scheme| UpcomingDeadline {
                id: scheme.id.clone(),
                name: scheme.name.clone(),
                deadline: scheme.deadline,
                days_remaining: (scheme.deadline - today).num_days(),
            })
            .collect();

        let eligible_schemes = active
            .iter()
            .filter(|scheme| scorer.score(&profile, &scheme.conditions).is_eligible)
            .map(|scheme| DashboardScheme {
                id: scheme.id.clone(),
                name: scheme.name.clone(),
                department: scheme.department.clone(),
                description: scheme.description.clone().unwrap_or_else(|| {
                    format!("{} by {}", scheme.scheme_type, scheme.department)
                }),
                deadline: scheme.deadline,
            })
            .collect();

        Ok(Dashboard {
            profile_id: profile.id,
            today,
            eligible_schemes,
            upcoming_deadlines,
        })
    }

    /// Evaluate an ad-hoc profile against an ad-hoc ruleset.
    pub fn check(&self, profile: &Profile, ruleset: &Ruleset) -> EligibilityCheck {
        let result = EligibilityScorer::new(self.today()).score(profile, ruleset);
        let band = self.policy.classify(&result);
        EligibilityCheck {
            reason: band.reason().to_string(),
            band,
            result,
        }
    }

    fn profile(&self, profile_id: &ProfileId) -> Result<Profile, MatchingServiceError> {
        self.profiles
            .fetch(profile_id)?
            .ok_or_else(|| MatchingServiceError::ProfileNotFound(profile_id.clone()))
    }

    fn scheme(&self, scheme_id: &SchemeId) -> Result<Scheme, MatchingServiceError> {
        self.schemes
            .fetch(scheme_id)?
            .ok_or_else(|| MatchingServiceError::SchemeNotFound(scheme_id.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub scheme_id: SchemeId,
    pub status: SchemeStatus,
    pub evaluated: usize,
    pub matched_profiles: Vec<ProfileId>,
    pub total_matches: usize,
    pub degraded: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeMatches {
    pub scheme_id: SchemeId,
    pub status: SchemeStatus,
    pub matched_profiles: Vec<ProfileId>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardScheme {
    pub id: SchemeId,
    pub name: String,
    pub department: String,
    pub description: String,
    pub deadline: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingDeadline {
    pub id: SchemeId,
    pub name: String,
    pub deadline: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub profile_id: ProfileId,
    pub today: NaiveDate,
    pub eligible_schemes: Vec<DashboardScheme>,
    pub upcoming_deadlines: Vec<UpcomingDeadline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityCheck {
    #[serde(flatten)]
    pub result: EligibilityResult,
    pub band: EligibilityBand,
    pub reason: String,
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("profile {0} not found")]
    ProfileNotFound(ProfileId),
    #[error("scheme {0} not found")]
    SchemeNotFound(SchemeId),
    #[error("scheme {scheme_id} has {} invalid rule(s)", .issues.len())]
    InvalidRuleset {
        scheme_id: SchemeId,
        issues: Vec<RulesetIssue>,
    },
}
