use std::sync::Arc;

use super::common::*;
use crate::config::MatchingConfig;
use crate::eligibility::domain::{
    Profile, ProfileId, ProfileRole, Scheme, SchemeId, SchemeStatus,
};
use crate::eligibility::repository::StoreError;
use crate::eligibility::rules::{ConditionGroup, FieldName, Operator};
use crate::eligibility::scoring::EligibilityBand;
use crate::eligibility::service::{MatchingServiceError, SchemeMatchingService};

fn published(id: &str, deadline: chrono::NaiveDate) -> Scheme {
    Scheme {
        status: SchemeStatus::Published,
        department: "Social Justice".to_string(),
        ..scheme(id, deadline, low_income_obc_rules())
    }
}

fn population() -> Vec<Profile> {
    vec![
        student("p-1"),
        with_income("p-2", 950_000.0),
        Profile {
            role: ProfileRole::Admin,
            ..student("admin")
        },
        Profile {
            role: ProfileRole::NormalUser,
            ..student("p-3")
        },
    ]
}

#[test]
fn publish_records_matches_for_non_admin_profiles() {
    let (service, schemes) = build_service(
        population(),
        vec![scheme("s-1", date(2024, 7, 1), low_income_obc_rules())],
    );

    let outcome = service.publish(&SchemeId::from("s-1")).expect("publish");

    assert_eq!(outcome.status, SchemeStatus::Published);
    assert_eq!(outcome.evaluated, 3);
    assert_eq!(
        outcome.matched_profiles,
        vec![ProfileId::from("p-1"), ProfileId::from("p-3")]
    );
    assert_eq!(outcome.total_matches, 2);
    assert!(outcome.warnings.is_empty());

    let stored = schemes.get("s-1").expect("stored scheme");
    assert_eq!(stored.status, SchemeStatus::Published);
    assert_eq!(stored.total_matches, 2);
    assert_eq!(stored.matched_profiles, outcome.matched_profiles);

    let matches = service.matches(&SchemeId::from("s-1")).expect("matches");
    assert_eq!(matches.total, 2);
}

#[test]
fn publish_rejects_rulesets_with_errors() {
    let broken = ruleset(vec![
        ConditionGroup::all(vec![row(FieldName::Age, Operator::Between, "eighteen")]),
        ConditionGroup::any(Vec::new()),
    ]);
    let (service, schemes) =
        build_service(population(), vec![scheme("s-1", date(2024, 7, 1), broken)]);

    let error = service
        .publish(&SchemeId::from("s-1"))
        .expect_err("invalid ruleset");

    match &error {
        MatchingServiceError::InvalidRuleset { issues, .. } => assert_eq!(issues.len(), 2),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(error.to_string(), "scheme s-1 has 2 invalid rule(s)");
    assert_eq!(
        schemes.get("s-1").expect("stored scheme").status,
        SchemeStatus::Draft
    );
}

#[test]
fn publish_surfaces_warnings_without_rejecting() {
    let rules = ruleset(vec![ConditionGroup::all(vec![row(
        FieldName::Category,
        Operator::Equals,
        "EWS",
    )])]);
    let (service, _) = build_service(population(), vec![scheme("s-1", date(2024, 7, 1), rules)]);

    let outcome = service.publish(&SchemeId::from("s-1")).expect("publish");

    assert_eq!(outcome.total_matches, 0);
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn publish_of_unknown_scheme_is_not_found() {
    let (service, _) = build_service(population(), Vec::new());
    let error = service
        .publish(&SchemeId::from("missing"))
        .expect_err("unknown scheme");
    assert!(matches!(error, MatchingServiceError::SchemeNotFound(_)));
}

#[test]
fn results_partition_the_whole_catalog_for_a_profile() {
    let deadline = date(2024, 7, 1);
    let (service, _) = build_service(
        population(),
        vec![
            published("s-1", deadline),
            scheme(
                "s-2",
                deadline,
                ruleset(vec![ConditionGroup::all(vec![row(
                    FieldName::Gender,
                    Operator::Equals,
                    "Male",
                )])]),
            ),
        ],
    );

    let results = service.results_for(&ProfileId::from("p-1")).expect("results");

    assert_eq!(results.eligible_count, 1);
    assert_eq!(results.not_eligible_count, 1);
    assert_eq!(results.total(), 2);
}

#[test]
fn results_for_unknown_profile_is_not_found() {
    let (service, _) = build_service(population(), Vec::new());
    let error = service
        .results_for(&ProfileId::from("nobody"))
        .expect_err("unknown profile");
    assert!(matches!(error, MatchingServiceError::ProfileNotFound(_)));
}

#[test]
fn dashboard_lists_active_eligible_schemes_and_closing_deadlines() {
    let closing_soon = published("s-soon", date(2024, 6, 20));
    let later = Scheme {
        description: Some("Tuition support".to_string()),
        ..published("s-later", date(2024, 9, 1))
    };
    let expired = published("s-expired", date(2024, 6, 14));
    let draft = scheme("s-draft", date(2024, 7, 1), low_income_obc_rules());
    let ineligible = Scheme {
        conditions: ruleset(vec![ConditionGroup::all(vec![row(
            FieldName::Category,
            Operator::Equals,
            "SC",
        )])]),
        ..published("s-sc", date(2024, 6, 18))
    };

    let (service, _) = build_service(
        population(),
        vec![later, expired, draft, ineligible, closing_soon],
    );

    let dashboard = service.dashboard(&ProfileId::from("p-1")).expect("dashboard");

    assert_eq!(dashboard.today, today());
    let eligible: Vec<&str> = dashboard
        .eligible_schemes
        .iter()
        .map(|scheme| scheme.id.0.as_str())
        .collect();
    assert_eq!(eligible, vec!["s-soon", "s-later"]);
    assert_eq!(
        dashboard.eligible_schemes[0].description,
        "Scholarship by Social Justice"
    );
    assert_eq!(dashboard.eligible_schemes[1].description, "Tuition support");

    let upcoming: Vec<(&str, i64)> = dashboard
        .upcoming_deadlines
        .iter()
        .map(|deadline| (deadline.id.0.as_str(), deadline.days_remaining))
        .collect();
    assert_eq!(upcoming, vec![("s-sc", 3), ("s-soon", 5)]);
}

#[test]
fn dashboard_window_past_the_calendar_end_covers_every_active_scheme() {
    let config = MatchingConfig {
        deadline_window_days: u32::MAX,
        ..matching_config()
    };
    let service = SchemeMatchingService::new(
        Arc::new(MemoryProfiles::with(population())),
        Arc::new(MemorySchemes::with(vec![
            published("s-soon", date(2024, 6, 20)),
            published("s-far", date(2099, 12, 31)),
        ])),
        &config,
    );

    let dashboard = service.dashboard(&ProfileId::from("p-1")).expect("dashboard");

    let upcoming: Vec<&str> = dashboard
        .upcoming_deadlines
        .iter()
        .map(|deadline| deadline.id.0.as_str())
        .collect();
    assert_eq!(upcoming, vec!["s-soon", "s-far"]);
}

#[test]
fn check_classifies_an_ad_hoc_profile() {
    let (service, _) = build_service(Vec::new(), Vec::new());
    let rules = ruleset(vec![
        ConditionGroup::all(vec![row(FieldName::Category, Operator::Equals, "OBC")]),
        ConditionGroup::all(vec![row(FieldName::Age, Operator::Between, "18-25")]),
        ConditionGroup::all(vec![row(FieldName::Gender, Operator::Equals, "Male")]),
    ]);

    let check = service.check(&student("adhoc"), &rules);

    assert_eq!(check.result.score, 67);
    assert_eq!(check.band, EligibilityBand::Partial);
    assert_eq!(check.reason, "You partially meet the eligibility criteria");
}

#[test]
fn store_outages_propagate() {
    let service = SchemeMatchingService::new(
        Arc::new(UnavailableProfiles),
        Arc::new(MemorySchemes::default()),
        &matching_config(),
    );

    let error = service
        .results_for(&ProfileId::from("p-1"))
        .expect_err("store offline");
    assert!(matches!(
        error,
        MatchingServiceError::Store(StoreError::Unavailable(_))
    ));
}
