//! Scenario loading and configuration.
//!
//! Scenarios define the ruleset, seed, tick limit and scripted building
//! purchases for a headless game.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use prospect_core::building::BuildingKind;
use prospect_core::config::GameConfig;
use prospect_core::error::GameError;
use prospect_core::resources::Job;

/// Default tick limit for a scenario that does not set one.
pub const DEFAULT_MAX_TICKS: u64 = 1_000;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The embedded game configuration was rejected.
    #[error("Invalid scenario: {0}")]
    Invalid(#[from] GameError),
}

/// A building purchase issued before a given tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Number of completed ticks at which the purchase is attempted.
    pub tick: u64,
    /// What to build.
    pub kind: BuildingKind,
    /// Job specialisation, if any.
    #[serde(default)]
    pub job: Option<Job>,
}

impl Purchase {
    /// Create a new purchase order.
    #[must_use]
    pub const fn new(tick: u64, kind: BuildingKind, job: Option<Job>) -> Self {
        Self { tick, kind, job }
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Default seed when none is given on the command line.
    pub seed: u64,
    /// Tick limit before a game counts as timed out.
    pub max_ticks: u64,
    /// Ruleset.
    pub config: GameConfig,
    /// Scripted building purchases.
    pub purchases: Vec<Purchase>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            description: "Default ruleset on a 20x20 map".to_string(),
            seed: 0,
            max_ticks: DEFAULT_MAX_TICKS,
            config: GameConfig::default(),
            purchases: Vec::new(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed or carries an
    /// invalid game configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    ///
    /// # Errors
    ///
    /// Fails on malformed RON or an invalid game configuration.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// Default rules plus an economy build: a lumberjack factory and a
    /// miner tool factory as soon as they can be afforded.
    #[must_use]
    pub fn expansion() -> Self {
        Self {
            name: "Expansion".to_string(),
            description: "Default rules with scripted factory purchases".to_string(),
            purchases: vec![
                Purchase::new(40, BuildingKind::UnitFactory, Some(Job::Lumberjack)),
                Purchase::new(80, BuildingKind::ToolFactory, Some(Job::Miner)),
            ],
            ..Self::default()
        }
    }

    /// Purchases scheduled before the given tick, in file order.
    pub fn purchases_at(&self, tick: u64) -> impl Iterator<Item = &Purchase> + '_ {
        self.purchases.iter().filter(move |p| p.tick == tick)
    }
}
