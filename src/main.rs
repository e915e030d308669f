use clap::Parser;
use comps_engine::config::Settings;
use comps_engine::models::{ScoreWeights, SearchParameters, SearchSummary};
use comps_engine::services::PgCandidateSource;
use comps_engine::{ScoreModel, SearchError, SimilaritySearchService};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Find comparable properties for an appraisal district account
#[derive(Debug, Parser)]
#[command(name = "comps", version, about)]
struct Cli {
    /// Account number of the subject property
    account: String,

    /// Search radius in miles
    #[arg(long)]
    radius: Option<f64>,

    /// Maximum number of comparables to return
    #[arg(long)]
    limit: Option<usize>,

    /// Minimum similarity score (0-100)
    #[arg(long)]
    min_score: Option<f64>,

    /// Maximum number of candidates to examine
    #[arg(long)]
    safety_cap: Option<usize>,

    /// Configuration file (defaults to config/default.toml + config/local.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Include score and distance statistics in the output
    #[arg(long)]
    summary: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_logging();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration loaded successfully");

    // Weight table is validated once, here
    let weights = ScoreWeights::from(&settings.scoring.weights);
    let model = match ScoreModel::new(weights) {
        Ok(m) => m,
        Err(e) => {
            error!("Invalid scoring weights: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Score model initialized with weights: {:?}", weights);

    let source = match PgCandidateSource::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to connect to PostgreSQL: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = SimilaritySearchService::new(Arc::new(source), model);

    let mut params = SearchParameters::from(&settings.search);
    if let Some(radius) = cli.radius {
        params.max_radius_miles = radius;
    }
    if let Some(limit) = cli.limit {
        params.max_results = limit;
    }
    if let Some(min_score) = cli.min_score {
        params.min_score = min_score;
    }
    if let Some(cap) = cli.safety_cap {
        params.safety_cap = cap;
    }

    // Ctrl-C abandons the search at the next batch boundary
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let outcome = match service
        .find_similar_with_cancel(&cli.account, &params, &cancel)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Search failed: {}", e);
            return match e {
                SearchError::NotFound(_) | SearchError::InvalidInput(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            };
        }
    };

    let report = if cli.summary {
        serde_json::json!({
            "account": cli.account,
            "outcome": outcome,
            "summary": SearchSummary::from_results(&outcome.results),
        })
    } else {
        serde_json::json!({
            "account": cli.account,
            "outcome": outcome,
        })
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize results: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging from LOG_LEVEL and LOG_FORMAT
///
/// Logs go to stderr so stdout carries only the JSON report.
fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}
