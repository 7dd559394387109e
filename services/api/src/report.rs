use crate::cli::CatalogArgs;
use crate::infra::seed_stores;
use chrono::NaiveDate;
use clap::Args;
use scheme_eligibility::config::AppConfig;
use scheme_eligibility::eligibility::{
    ProfileId, ProfileStore, SchemeEligibility, SchemeId, SchemeMatchingService, SchemeResults,
};
use scheme_eligibility::error::AppError;
use scheme_eligibility::telemetry;
use std::io;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ResultsArgs {
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
    /// Only report on this profile (defaults to every profile in the export)
    #[arg(long)]
    pub(crate) profile_id: Option<String>,
    /// Evaluation date for ages and deadlines (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the results as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PublishArgs {
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
    /// Scheme to publish
    #[arg(long)]
    pub(crate) scheme_id: String,
    /// Evaluation date for ages and deadlines (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the outcome as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_results(args: ResultsArgs) -> Result<(), AppError> {
    let ResultsArgs {
        catalog,
        profile_id,
        today,
        json,
    } = args;

    let config = load_config(today)?;
    let (profiles, schemes) = seed_stores(&catalog)?;
    let ids: Vec<ProfileId> = match profile_id {
        Some(id) => vec![ProfileId(id)],
        None => profiles
            .all()
            .map_err(|err| AppError::Matching(err.into()))?
            .into_iter()
            .map(|profile| profile.id)
            .collect(),
    };
    let service =
        SchemeMatchingService::new(Arc::new(profiles), Arc::new(schemes), &config.matching);

    for id in ids {
        let results = service.results_for(&id)?;
        if json {
            print_json(&serde_json::json!({ "profile_id": id, "results": results }))?;
        } else {
            render_results(&id, service.today(), &results);
        }
    }

    Ok(())
}

pub(crate) fn run_publish(args: PublishArgs) -> Result<(), AppError> {
    let PublishArgs {
        catalog,
        scheme_id,
        today,
        json,
    } = args;

    let config = load_config(today)?;
    let (profiles, schemes) = seed_stores(&catalog)?;
    let service =
        SchemeMatchingService::new(Arc::new(profiles), Arc::new(schemes), &config.matching);

    let outcome = service.publish(&SchemeId(scheme_id))?;
    if json {
        return print_json(&outcome);
    }

    println!(
        "Published {} on {}: {} of {} profiles fully eligible",
        outcome.scheme_id,
        service.today(),
        outcome.total_matches,
        outcome.evaluated
    );
    if outcome.degraded > 0 {
        println!(
            "- {} profiles hit conditions that could not be evaluated",
            outcome.degraded
        );
    }
    for warning in &outcome.warnings {
        println!("- warning: {warning}");
    }
    for profile in &outcome.matched_profiles {
        println!("  - {profile}");
    }

    Ok(())
}

fn load_config(today: Option<NaiveDate>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if today.is_some() {
        config.matching.clock_date = today;
    }
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

fn render_results(profile_id: &ProfileId, today: NaiveDate, results: &SchemeResults) {
    println!(
        "\nProfile {profile_id} (evaluated {today}): {} eligible | {} partial | {} not eligible",
        results.eligible_count, results.partial_count, results.not_eligible_count
    );
    render_band("Eligible", &results.eligible_schemes);
    render_band("Partial match", &results.partial_match_schemes);
    render_band("Not eligible", &results.not_eligible_schemes);
    if results.degraded_count > 0 {
        println!(
            "  {} schemes contain conditions that could not be evaluated",
            results.degraded_count
        );
    }
}

fn render_band(title: &str, entries: &[SchemeEligibility]) {
    if entries.is_empty() {
        return;
    }
    println!("{title}:");
    for entry in entries {
        println!("  - {} [{}] score {}", entry.name, entry.id, entry.score);
        for requirement in &entry.missing {
            println!("      missing: {requirement}");
        }
    }
}
