//! Headless game runner for balance batches and determinism verification.
//!
//! This crate plays Prospect games without any front end:
//!
//! - **Single runs**: play a RON scenario to the end and print its metrics
//! - **Batches**: run many seeds in parallel and aggregate win/loss stats
//! - **Verification**: replay one seed and compare final state hashes
//!
//! # Output
//!
//! - **stdout**: JSON metrics
//! - **stderr**: Logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Run a scenario
//! cargo run -p prospect_headless -- run --scenario scenarios/default.ron
//!
//! # Run 500 seeds
//! cargo run -p prospect_headless -- batch --count 500 --output results/
//!
//! # Verify determinism
//! cargo run -p prospect_headless -- verify --seed 42 --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod game_runner;
pub mod metrics;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use game_runner::{run_game, GameResult, GameRunConfig, GameRunner};
pub use metrics::{BatchSummary, GameMetrics, GameOutcome, MetricsCollector};
pub use scenario::{Purchase, Scenario, ScenarioError};
