//! Headless Prospect game runner.
//!
//! Plays games in automatic mode without a front end.
//!
//! # Usage
//!
//! ```bash
//! # Run a single game with a scenario
//! cargo run -p prospect_headless -- run --scenario scenarios/default.ron
//!
//! # Run a batch of seeds for balance testing
//! cargo run -p prospect_headless -- batch --count 1000 --output results/
//!
//! # Verify that a seed replays identically
//! cargo run -p prospect_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! Metrics go to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prospect_headless::{
    batch::{run_batch, verify_determinism, BatchConfig, RESULTS_FILE},
    game_runner::{GameRunConfig, GameRunner},
    scenario::{Scenario, ScenarioError},
};

#[derive(Parser)]
#[command(name = "prospect_headless")]
#[command(about = "Headless Prospect game runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game and print its metrics
    Run {
        /// Scenario file to load (default rules if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Override the scenario seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the scenario tick limit
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Run a batch of seeds for balance testing
    Batch {
        /// Scenario file to load (default rules if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Override the scenario tick limit
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario file to load (default rules if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for metrics)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let outcome = match cli.command {
        Commands::Run {
            scenario,
            seed,
            max_ticks,
        } => cmd_run(scenario.as_deref(), seed, max_ticks),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            max_ticks,
        } => cmd_batch(scenario.as_deref(), count, parallel, output, seed, max_ticks),
        Commands::Verify {
            scenario,
            seed,
            runs,
        } => cmd_verify(scenario.as_deref(), seed, runs),
    };

    match outcome {
        Ok(code) => code,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario, ScenarioError> {
    match path {
        Some(path) => {
            tracing::info!("Loading scenario from: {}", path.display());
            Scenario::load(path)
        }
        None => Ok(Scenario::default()),
    }
}

/// Run a single game
fn cmd_run(
    scenario: Option<&Path>,
    seed: Option<u64>,
    max_ticks: Option<u64>,
) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario).map_err(|e| e.to_string())?;
    let mut config = GameRunConfig::from_scenario(scenario);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(max_ticks) = max_ticks {
        config = config.with_max_ticks(max_ticks);
    }

    let result = GameRunner::new().run(config).map_err(|e| e.to_string())?;
    let json = serde_json::to_string(&result.metrics).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

/// Run batch of games for balance testing
fn cmd_batch(
    scenario: Option<&Path>,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_ticks: Option<u64>,
) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario).map_err(|e| e.to_string())?;

    std::fs::create_dir_all(&output).map_err(|e| {
        format!(
            "Cannot create output directory '{}': {e}",
            output.display()
        )
    })?;

    tracing::info!(
        scenario = %scenario.name,
        count,
        parallel,
        seed,
        output = %output.display(),
        "Batch configuration"
    );

    let config = BatchConfig {
        parallel_games: parallel,
        max_ticks: max_ticks.unwrap_or(0),
        ..BatchConfig::new(scenario, count)
            .with_output(output.clone())
            .with_seed(seed)
    };
    let results = run_batch(config);

    let results_path = output.join(RESULTS_FILE);
    results
        .save(&results_path)
        .map_err(|e| format!("Failed to save results: {e}"))?;

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Won: {}  Lost: {}  Timed out: {}  (win rate {:.1}%)",
        summary.won,
        summary.lost,
        summary.timeouts,
        summary.win_rate * 100.0
    );
    eprintln!("Mean ticks: {:.1}", summary.avg_duration_ticks);
    eprintln!("Mean resources mined: {:.1}", summary.avg_resources_mined);

    for error in results.errors.iter().take(10) {
        eprintln!(
            "  Game {} (seed {}): {}",
            error.game_index, error.seed, error.message
        );
    }

    eprintln!("\nResults saved to: {}", results_path.display());
    Ok(if results.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Verify determinism
fn cmd_verify(scenario: Option<&Path>, seed: u64, runs: u32) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario).map_err(|e| e.to_string())?;
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    if verify_determinism(&scenario, seed, runs).map_err(|e| e.to_string())? {
        eprintln!("PASS: All {runs} runs produced identical results");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        Ok(ExitCode::FAILURE)
    }
}
