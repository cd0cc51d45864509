//! Game metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] folds tick events into [`GameMetrics`]; a
//! [`BatchSummary`] aggregates many games.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use prospect_core::resources::ResourceType;
use prospect_core::simulation::{GameStatus, Simulation, TickEvent, TickSummary};

/// How a headless game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Every vein was emptied.
    Won,
    /// No unit could work any more.
    Lost,
    /// The tick limit was reached first.
    #[default]
    Timeout,
}

impl From<GameStatus> for GameOutcome {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Won => Self::Won,
            GameStatus::Lost => Self::Lost,
            GameStatus::Running => Self::Timeout,
        }
    }
}

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Total game duration in ticks.
    pub duration_ticks: u64,
    /// How the game ended.
    pub outcome: GameOutcome,

    // === Economy ===
    /// Resources mined, per type.
    pub resources_mined: BTreeMap<ResourceType, u64>,
    /// Vein total left on the map at the end.
    pub remaining_resources: u64,
    /// Buildings bought.
    pub buildings_purchased: u32,
    /// Purchases refused for lack of resources.
    pub purchases_rejected: u32,
    /// Production attempts that could not be paid for.
    pub production_blocked: u32,

    // === Units ===
    /// Units spawned by factories.
    pub units_spawned: u32,
    /// Tools handed to toolless units.
    pub tools_equipped: u32,
    /// Tools upgraded.
    pub tools_upgraded: u32,
    /// Groups formed or grown.
    pub groups_formed: u32,
    /// Unit-turns lost to hunger.
    pub starvations: u32,
    /// Units on the map at the end.
    pub final_units: u32,

    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Total resources mined over the game.
    #[must_use]
    pub fn total_mined(&self) -> u64 {
        self.resources_mined.values().sum()
    }
}

/// Accumulates metrics while a game runs.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    metrics: GameMetrics,
}

impl MetricsCollector {
    /// Start collecting for one game.
    #[must_use]
    pub fn new(game_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            metrics: GameMetrics::new(game_id, scenario, seed),
        }
    }

    /// Fold one tick's events in.
    pub fn record_tick(&mut self, summary: &TickSummary) {
        let metrics = &mut self.metrics;
        metrics.duration_ticks = summary.tick;
        for event in &summary.events {
            match event {
                TickEvent::UnitMined {
                    resource, amount, ..
                } => {
                    *metrics.resources_mined.entry(*resource).or_default() += u64::from(*amount);
                }
                TickEvent::GroupFormed { .. } => metrics.groups_formed += 1,
                TickEvent::UnitStarved { .. } => metrics.starvations += 1,
                TickEvent::UnitSpawned { .. } => metrics.units_spawned += 1,
                TickEvent::ToolEquipped { .. } => metrics.tools_equipped += 1,
                TickEvent::ToolUpgraded { .. } => metrics.tools_upgraded += 1,
                TickEvent::ProductionBlocked { .. } => metrics.production_blocked += 1,
                TickEvent::UnitMoved { .. } | TickEvent::GroupDissolved { .. } => {}
            }
        }
    }

    /// Record a building purchase attempt.
    pub fn record_purchase(&mut self, accepted: bool) {
        if accepted {
            self.metrics.buildings_purchased += 1;
        } else {
            self.metrics.purchases_rejected += 1;
        }
    }

    /// Close the record with the final state of the game.
    #[must_use]
    pub fn finish(mut self, sim: &Simulation) -> GameMetrics {
        let metrics = &mut self.metrics;
        metrics.duration_ticks = sim.tick();
        metrics.outcome = sim.status().into();
        metrics.remaining_resources = sim.world().remaining_resources();
        metrics.final_units = u32::try_from(sim.units().count()).unwrap_or(u32::MAX);
        metrics.final_state_hash = sim.state_hash();
        self.metrics
    }
}

/// Aggregate statistics over a batch of games.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games won.
    pub won: u32,
    /// Games lost.
    pub lost: u32,
    /// Games that hit the tick limit.
    pub timeouts: u32,
    /// Fraction of games won.
    pub win_rate: f64,
    /// Average game duration in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest game.
    pub min_duration_ticks: u64,
    /// Longest game.
    pub max_duration_ticks: u64,
    /// Average resources mined per game.
    pub avg_resources_mined: f64,
    /// Average units spawned per game.
    pub avg_units_spawned: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_games: u32::try_from(games.len()).unwrap_or(u32::MAX),
            min_duration_ticks: u64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut mined_sum = 0u64;
        let mut spawned_sum = 0u64;

        for game in games {
            duration_sum += game.duration_ticks;
            summary.min_duration_ticks = summary.min_duration_ticks.min(game.duration_ticks);
            summary.max_duration_ticks = summary.max_duration_ticks.max(game.duration_ticks);
            mined_sum += game.total_mined();
            spawned_sum += u64::from(game.units_spawned);

            match game.outcome {
                GameOutcome::Won => summary.won += 1,
                GameOutcome::Lost => summary.lost += 1,
                GameOutcome::Timeout => summary.timeouts += 1,
            }
        }

        let n = games.len() as f64;
        summary.win_rate = f64::from(summary.won) / n;
        summary.avg_duration_ticks = duration_sum as f64 / n;
        summary.avg_resources_mined = mined_sum as f64 / n;
        summary.avg_units_spawned = spawned_sum as f64 / n;
        summary
    }
}
