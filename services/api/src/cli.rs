use crate::report::{run_publish, run_results, PublishArgs, ResultsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scheme_eligibility::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Scheme Eligibility",
    about = "Match citizen profiles against government scheme rulesets",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify every scheme in a catalog export for one or more profiles
    Results(ResultsArgs),
    /// Publish a scheme from a catalog export and list the matched profiles
    Publish(PublishArgs),
}

/// JSON exports used to seed the in-memory stores.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CatalogArgs {
    /// Profile export (JSON array of profile records)
    #[arg(long)]
    pub(crate) profiles: Option<PathBuf>,
    /// Scheme export (JSON array of scheme records)
    #[arg(long)]
    pub(crate) schemes: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Results(args) => run_results(args),
        Command::Publish(args) => run_publish(args),
    }
}
