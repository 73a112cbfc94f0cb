use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gatekeeper::app::{AppState, Operation};
use gatekeeper::config::{AppConfig, Overrides};
use gatekeeper::error::AppError;
use gatekeeper::workflow::WorkflowOutcome;

#[derive(Parser)]
#[command(
    name = "gatekeeper",
    about = "Assigns required reviewers and gates pull requests on their approvals"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// GitHub authentication token
    #[arg(long, global = true)]
    token: Option<String>,

    /// JSON object mapping authors to their required reviewers
    #[arg(long, global = true)]
    assignments: Option<String>,

    /// Path to the webhook event payload
    #[arg(long, global = true)]
    event_path: Option<PathBuf>,

    /// Organization owning the internal team
    #[arg(long, global = true)]
    org: Option<String>,

    /// Slug of the team whose members are internal contributors
    #[arg(long, global = true)]
    team_slug: Option<String>,

    /// Reviewers required for authors without an assignment, comma separated
    #[arg(long, global = true, value_delimiter = ',')]
    default_reviewers: Option<Vec<String>>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Request the required reviewers on a newly opened pull request
    AssignReviewers,
    /// Check that every required reviewer approved the pull request
    CheckReviewers,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

impl Cli {
    fn operation(&self) -> Operation {
        match self.command {
            Command::AssignReviewers => Operation::AssignReviewers,
            Command::CheckReviewers => Operation::CheckReviewers,
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            assignments: self.assignments.clone(),
            event_path: self.event_path.clone(),
            org: self.org.clone(),
            team_slug: self.team_slug.clone(),
            default_reviewers: self.default_reviewers.clone(),
        }
    }
}

fn init_tracing(format: LogFormat) {
    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(pretty)
        .with(json)
        .init();
}

async fn run(cli: &Cli, operation: Operation) -> anyhow::Result<WorkflowOutcome> {
    let config = AppConfig::load(cli.config.as_deref(), cli.overrides())
        .context("Failed to load configuration")?;
    config.validate_for(operation)?;
    tracing::debug!(?config, "Loaded configuration");

    let state = AppState::new(config)?;
    let outcome = state
        .run_operation(operation)
        .await
        .with_context(|| format!("{operation} failed"))?;

    Ok(outcome)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let operation = cli.operation();
    tracing::info!(%operation, "Starting");

    match run(&cli, operation).await {
        Ok(outcome) => {
            tracing::info!(%operation, ?outcome, "Finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let not_ready = e
                .downcast_ref::<AppError>()
                .is_some_and(AppError::is_not_ready);
            tracing::error!(%operation, not_ready, error = %format!("{e:#}"), "Failed");
            ExitCode::FAILURE
        }
    }
}
