//! Generate today's language cards.
//!
//! Reads the API key from the `OPENROUTER_KEY` environment variable. Exits 0
//! after writing `today.json` and updating `history.json`, 1 when no valid set
//! could be produced or the documents could not be written, and 2 on a
//! configuration error.
//!
//! # Examples
//!
//! ```sh
//! # Daily run (e.g. from cron)
//! daycard --history data/history.json --today data/today.json
//!
//! # Backfill a specific date
//! daycard --date 2024-01-02
//!
//! # Preview cards without persisting them
//! daycard --dry-run
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use daycard::config::DEFAULT_ATTEMPT_TIMEOUT;
use daycard::history::DEFAULT_HISTORY_WINDOW;
use daycard::store::{DEFAULT_HISTORY_PATH, DEFAULT_TODAY_PATH};
use daycard::{CardConfig, Generation, Orchestrator, RunError};
use daycard_llm::ChatGenerator;
use daycard_llm::api::retry::DEFAULT_MAX_ATTEMPTS;
use tracing::{error, info};

/// Generate today's English and Japanese vocabulary cards.
#[derive(Parser)]
#[command(name = "daycard")]
struct Cli {
    /// Path of the rolling word history.
    #[arg(long, default_value = DEFAULT_HISTORY_PATH)]
    history: PathBuf,

    /// Path of today's cards.
    #[arg(long, default_value = DEFAULT_TODAY_PATH)]
    today: PathBuf,

    /// Model to use for generation.
    #[arg(long, default_value = daycard_llm::DEFAULT_MODEL)]
    model: String,

    /// Attempts before giving up.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_attempts: u32,

    /// Days a word stays banned (also the history length).
    #[arg(
        long,
        default_value_t = DEFAULT_HISTORY_WINDOW,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    window: usize,

    /// Seconds allowed per generation attempt.
    #[arg(
        long,
        default_value_t = DEFAULT_ATTEMPT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// Date recorded in the history (YYYY-MM-DD). Defaults to local today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Generate and validate, print the cards, and persist nothing.
    #[arg(long)]
    dry_run: bool,

    /// Print the currently banned words and exit.
    #[arg(long)]
    show_banned: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = CardConfig::default()
        .with_model(cli.model)
        .with_max_attempts(cli.max_attempts)
        .with_history_window(cli.window)
        .with_attempt_timeout(Duration::from_secs(cli.timeout_secs))
        .with_paths(cli.history, cli.today);
    let store = config.store();

    if cli.show_banned {
        let banned = store.load_history().banned_words(config.history_window);
        for word in banned.sorted() {
            println!("{word}");
        }
        return ExitCode::SUCCESS;
    }

    let api_key = match std::env::var("OPENROUTER_KEY") {
        Ok(key) => key,
        Err(_) => {
            error!("OPENROUTER_KEY environment variable is not set");
            return ExitCode::from(2);
        }
    };

    let generator = match ChatGenerator::new(config.generation_config(api_key)) {
        Ok(g) => g,
        Err(e) => {
            error!("failed to create API client: {e}");
            return ExitCode::from(2);
        }
    };

    info!("generating with {}", generator.model());
    let orchestrator = Orchestrator::new(&generator, &store, &config);

    if cli.dry_run {
        return match orchestrator.generate(&orchestrator.banned_words()).await {
            Generation::Accepted { today, .. } => match serde_json::to_string_pretty(&today) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("failed to render cards: {e}");
                    ExitCode::FAILURE
                }
            },
            Generation::Exhausted { attempts, mut failures } => {
                let err = RunError::RetriesExhausted {
                    attempts,
                    last: failures.pop(),
                };
                error!("{err}");
                ExitCode::FAILURE
            }
        };
    }

    let date = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let result = orchestrator
        .run(date)
        .await
        .map_err(RunError::from)
        .and_then(|outcome| outcome.into_result());

    match result {
        Ok(_) => {
            println!("OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
