//! Real game execution for headless testing.
//!
//! Runs a scenario on the core [`Simulation`] in automatic mode, issuing
//! the scenario's scripted purchases, until the game ends or the tick limit
//! is reached.
//!
//! The tick loop is bounded by `max_ticks`; a game never runs unbounded.

use tracing::{debug, info, warn};

use prospect_core::error::GameError;
use prospect_core::simulation::{GameStatus, Simulation};

use crate::metrics::{GameMetrics, MetricsCollector};
use crate::scenario::Scenario;

/// Configuration for a single game run.
#[derive(Debug, Clone)]
pub struct GameRunConfig {
    /// Random seed for map generation and spawns.
    pub seed: u64,
    /// Maximum ticks before timeout.
    pub max_ticks: u64,
    /// Scenario to play.
    pub scenario: Scenario,
    /// Game ID for tracking.
    pub game_id: String,
}

impl GameRunConfig {
    /// Run `scenario` with its own seed and tick limit.
    #[must_use]
    pub fn from_scenario(scenario: Scenario) -> Self {
        Self {
            seed: scenario.seed,
            max_ticks: scenario.max_ticks,
            game_id: format!("game_{}", scenario.seed),
            scenario,
        }
    }

    /// Override the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.game_id = format!("game_{seed}");
        self
    }

    /// Override the tick limit.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// Result of one headless game.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Collected metrics.
    pub metrics: GameMetrics,
    /// Status when the run stopped.
    pub status: GameStatus,
    /// Final state hash.
    pub final_state_hash: u64,
}

/// High-level game runner for headless testing.
#[derive(Debug, Clone)]
pub struct GameRunner {
    /// Tick limit used when a run asks for 0.
    pub default_max_ticks: u64,
}

impl Default for GameRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRunner {
    /// Create a new game runner.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_max_ticks: crate::scenario::DEFAULT_MAX_TICKS,
        }
    }

    /// Run a game with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the scenario's ruleset is
    /// rejected.
    pub fn run(&self, mut config: GameRunConfig) -> Result<GameResult, GameError> {
        if config.max_ticks == 0 {
            config.max_ticks = self.default_max_ticks;
        }
        run_game(&config)
    }
}

/// Play one game to completion or timeout.
///
/// Purchases scheduled for tick `t` are attempted after `t` ticks have
/// completed, before the next tick runs. A purchase that cannot be paid for
/// is logged and skipped.
///
/// # Errors
///
/// Returns [`GameError::InvalidConfig`] if the scenario's ruleset is
/// rejected.
pub fn run_game(config: &GameRunConfig) -> Result<GameResult, GameError> {
    let scenario = &config.scenario;
    let mut sim = Simulation::new(scenario.config.clone(), config.seed)?;
    let mut collector = MetricsCollector::new(&config.game_id, &scenario.name, config.seed);

    info!(
        game = %config.game_id,
        scenario = %scenario.name,
        seed = config.seed,
        max_ticks = config.max_ticks,
        "Starting game"
    );

    while sim.tick() < config.max_ticks {
        for purchase in scenario.purchases_at(sim.tick()) {
            match sim.purchase_building(purchase.kind, purchase.job) {
                Ok(()) => collector.record_purchase(true),
                Err(GameError::InsufficientResources {
                    resource,
                    required,
                    available,
                }) => {
                    debug!(
                        tick = sim.tick(),
                        %resource,
                        required,
                        available,
                        "Purchase skipped"
                    );
                    collector.record_purchase(false);
                }
                Err(e) => return Err(e),
            }
        }

        let summary = sim.advance_turn_automatic()?;
        collector.record_tick(&summary);
        if summary.status.is_over() {
            break;
        }
    }

    let status = sim.status();
    if !status.is_over() {
        warn!(
            game = %config.game_id,
            ticks = sim.tick(),
            remaining = sim.world().remaining_resources(),
            "Game hit tick limit"
        );
    }

    let metrics = collector.finish(&sim);
    info!(
        game = %config.game_id,
        ticks = metrics.duration_ticks,
        outcome = ?metrics.outcome,
        mined = metrics.total_mined(),
        "Game finished"
    );
    Ok(GameResult {
        final_state_hash: metrics.final_state_hash,
        status,
        metrics,
    })
}
