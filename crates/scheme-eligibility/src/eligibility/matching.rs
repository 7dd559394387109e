use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::domain::{Profile, ProfileId, Scheme, SchemeId};
use super::rules::Ruleset;
use super::scoring::{ClassificationPolicy, EligibilityBand, EligibilityScorer};

/// Fully eligible profiles for one ruleset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationMatch {
    pub matched: Vec<ProfileId>,
    pub count: usize,
    /// Profiles whose evaluation hit at least one fail-closed condition.
    pub degraded: usize,
}

/// One scheme's standing for a profile, as listed on the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeEligibility {
    pub id: SchemeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub score: u8,
    pub reason: String,
    pub missing: Vec<String>,
}

/// Schemes partitioned by band for one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemeResults {
    pub eligible_count: usize,
    pub partial_count: usize,
    pub not_eligible_count: usize,
    pub eligible_schemes: Vec<SchemeEligibility>,
    pub partial_match_schemes: Vec<SchemeEligibility>,
    pub not_eligible_schemes: Vec<SchemeEligibility>,
    pub degraded_count: usize,
}

impl SchemeResults {
    fn push(&mut self, band: EligibilityBand, entry: SchemeEligibility) {
        match band {
            EligibilityBand::Eligible => {
                self.eligible_schemes.push(entry);
                self.eligible_count += 1;
            }
            EligibilityBand::Partial => {
                self.partial_match_schemes.push(entry);
                self.partial_count += 1;
            }
            EligibilityBand::NotEligible => {
                self.not_eligible_schemes.push(entry);
                self.not_eligible_count += 1;
            }
        }
    }

    pub fn total(&self) -> usize {
        self.eligible_count + self.partial_count + self.not_eligible_count
    }
}

/// Runs the scorer over a population of profiles or a catalog of schemes.
#[derive(Debug, Clone, Copy)]
pub struct PopulationMatcher {
    scorer: EligibilityScorer,
    policy: ClassificationPolicy,
}

impl PopulationMatcher {
    pub fn new(scorer: EligibilityScorer, policy: ClassificationPolicy) -> Self {
        Self { scorer, policy }
    }

    /// Profiles satisfying every group of `ruleset`, sorted by id.
    pub fn match_profiles(&self, ruleset: &Ruleset, profiles: &[Profile]) -> PopulationMatch {
        let assessed: Vec<(&ProfileId, bool, bool)> = profiles
            .par_iter()
            .map(|profile| {
                let assessment = self.scorer.assess(profile, ruleset);
                (
                    &profile.id,
                    assessment.result.is_eligible,
                    assessment.is_degraded(),
                )
            })
            .collect();

        let degraded = assessed.iter().filter(|(_, _, degraded)| *degraded).count();
        let mut matched: Vec<ProfileId> = assessed
            .into_iter()
            .filter(|(_, eligible, _)| *eligible)
            .map(|(id, _, _)| id.clone())
            .collect();
        matched.sort();

        PopulationMatch {
            count: matched.len(),
            matched,
            degraded,
        }
    }

    /// Classifies every scheme for `profile`; partitions keep catalog order.
    pub fn match_schemes(&self, profile: &Profile, schemes: &[Scheme]) -> SchemeResults {
        let classified: Vec<(EligibilityBand, SchemeEligibility, bool)> = schemes
            .par_iter()
            .map(|scheme| {
                let assessment = self.scorer.assess(profile, &scheme.conditions);
                let band = self.policy.classify(&assessment.result);
                let degraded = assessment.is_degraded();
                let entry = SchemeEligibility {
                    id: scheme.id.clone(),
                    name: scheme.name.clone(),
                    description: scheme.description.clone(),
                    score: assessment.result.score,
                    reason: band.reason().to_string(),
                    missing: assessment.result.missing,
                };
                (band, entry, degraded)
            })
            .collect();

        classified.into_iter().fold(
            SchemeResults::default(),
            |mut results, (band, entry, degraded)| {
                if degraded {
                    results.degraded_count += 1;
                }
                results.push(band, entry);
                results
            },
        )
    }
}
