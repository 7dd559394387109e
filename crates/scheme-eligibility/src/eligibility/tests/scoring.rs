use super::common::*;
use crate::eligibility::domain::Profile;
use crate::eligibility::rules::{ConditionGroup, FieldName, Operator, Ruleset};
use crate::eligibility::scoring::{
    ClassificationPolicy, EligibilityBand, EligibilityResult, PARTIAL_MATCH_THRESHOLD,
};

fn result(is_eligible: bool, score: u8) -> EligibilityResult {
    EligibilityResult {
        is_eligible,
        score,
        missing: Vec::new(),
    }
}

fn category_group(value: &str) -> ConditionGroup {
    ConditionGroup::all(vec![row(FieldName::Category, Operator::Equals, value)])
}

#[test]
fn empty_ruleset_is_universally_eligible() {
    for profile in [Profile::default(), student("p-1")] {
        assert_eq!(
            scorer().score(&profile, &Ruleset::default()),
            EligibilityResult::universal()
        );
    }
}

#[test]
fn fully_eligible_profile_scores_one_hundred() {
    let result = scorer().score(&student("p-1"), &low_income_obc_rules());
    assert_eq!(result, result_with_missing(true, 100, &[]));
}

#[test]
fn failing_group_contributes_its_rows_to_missing() {
    let rules = ruleset(vec![
        ConditionGroup::all(vec![row(
            FieldName::AnnualIncome,
            Operator::LessThan,
            "800000",
        )]),
        category_group("SC"),
    ]);
    let result = scorer().score(&student("p-1"), &rules);

    assert_eq!(result, result_with_missing(false, 50, &["Category Equals SC"]));
    assert_eq!(
        ClassificationPolicy::default().classify(&result),
        EligibilityBand::NotEligible
    );
}

#[test]
fn two_of_three_groups_is_a_partial_match() {
    let rules = ruleset(vec![
        category_group("OBC"),
        ConditionGroup::all(vec![row(FieldName::Gender, Operator::Equals, "Female")]),
        category_group("ST"),
    ]);
    let result = scorer().score(&student("p-1"), &rules);

    assert_eq!(result.score, 67);
    assert!(!result.is_eligible);
    assert_eq!(
        ClassificationPolicy::default().classify(&result),
        EligibilityBand::Partial
    );
}

#[test]
fn scores_round_half_up() {
    let profile = student("p-1");
    let passing = category_group("OBC");
    let failing = category_group("SC");

    let one_of_three = ruleset(vec![passing.clone(), failing.clone(), failing.clone()]);
    assert_eq!(scorer().score(&profile, &one_of_three).score, 33);

    let mut one_of_eight = vec![passing];
    one_of_eight.extend(std::iter::repeat(failing).take(7));
    assert_eq!(scorer().score(&profile, &ruleset(one_of_eight)).score, 13);
}

#[test]
fn repeated_requirements_are_listed_once_in_first_seen_order() {
    let rules = ruleset(vec![
        ConditionGroup::all(vec![
            row(FieldName::Category, Operator::Equals, "SC"),
            row(FieldName::Gender, Operator::Equals, "Male"),
        ]),
        category_group("SC"),
    ]);
    let result = scorer().score(&student("p-1"), &rules);

    assert_eq!(result.score, 0);
    assert_eq!(result.missing, vec!["Category Equals SC", "Gender Equals Male"]);
}

#[test]
fn scoring_is_deterministic() {
    let rules = ruleset(vec![category_group("OBC"), category_group("SC")]);
    let profile = student("p-1");
    assert_eq!(scorer().score(&profile, &rules), scorer().score(&profile, &rules));
}

#[test]
fn assessment_counts_fail_closed_conditions() {
    let mut profile = student("p-1");
    profile.annual_income = None;
    let assessment = scorer().assess(&profile, &low_income_obc_rules());

    assert_eq!(assessment.matched_groups, 0);
    assert_eq!(assessment.total_groups, 1);
    assert_eq!(assessment.fail_closed_conditions, 1);
    assert!(assessment.is_degraded());
    assert_eq!(
        assessment.result.missing,
        vec!["Annual Income Less Than 800000"]
    );
}

#[test]
fn threshold_is_exclusive() {
    let policy = ClassificationPolicy::default();
    assert_eq!(policy.partial_threshold(), PARTIAL_MATCH_THRESHOLD);
    assert_eq!(policy.classify(&result(false, 50)), EligibilityBand::NotEligible);
    assert_eq!(policy.classify(&result(false, 51)), EligibilityBand::Partial);
    assert_eq!(policy.classify(&result(false, 0)), EligibilityBand::NotEligible);
    assert_eq!(policy.classify(&result(true, 100)), EligibilityBand::Eligible);
}

#[test]
fn perfect_score_is_eligible_even_without_the_flag() {
    let policy = ClassificationPolicy::default();
    assert_eq!(policy.classify(&result(false, 100)), EligibilityBand::Eligible);
}

#[test]
fn custom_threshold_moves_the_partial_band() {
    let policy = ClassificationPolicy::new(60);
    assert_eq!(policy.classify(&result(false, 60)), EligibilityBand::NotEligible);
    assert_eq!(policy.classify(&result(false, 67)), EligibilityBand::Partial);
}

#[test]
fn bands_carry_fixed_reasons() {
    assert_eq!(
        EligibilityBand::Eligible.reason(),
        "You meet all eligibility criteria"
    );
    assert_eq!(
        EligibilityBand::Partial.reason(),
        "You partially meet the eligibility criteria"
    );
    assert_eq!(
        EligibilityBand::NotEligible.reason(),
        "You do not meet the eligibility criteria"
    );
}

fn result_with_missing(is_eligible: bool, score: u8, missing: &[&str]) -> EligibilityResult {
    EligibilityResult {
        is_eligible,
        score,
        missing: missing.iter().map(|entry| entry.to_string()).collect(),
    }
}
