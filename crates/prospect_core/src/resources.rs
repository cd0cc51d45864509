//! Resource catalogue and job specialisations.
//!
//! Resource kinds are a closed set defined at compile time. Spawn
//! parameters have defaults here and may be overridden per game through
//! [`GameConfig`](crate::config::GameConfig).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A set of resource amounts, e.g. a cost. Ordered for deterministic iteration.
pub type ResourceBundle = BTreeMap<ResourceType, u32>;

/// Kind of resource a cell vein can hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ResourceType {
    /// Timber, cut by lumberjacks.
    Wood,
    /// Stone, quarried by miners.
    Rock,
    /// Gold ore, dug by miners.
    Gold,
    /// Food, gathered by farmers and eaten by every unit each turn.
    Food,
}

impl ResourceType {
    /// Every resource kind, in catalogue order.
    pub const ALL: [Self; 4] = [Self::Wood, Self::Rock, Self::Gold, Self::Food];

    /// Single-character map symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Wood => 'W',
            Self::Rock => 'R',
            Self::Gold => 'G',
            Self::Food => 'F',
        }
    }

    /// Label of the job that works this resource.
    #[must_use]
    pub const fn job_label(self) -> &'static str {
        match self {
            Self::Wood => "Lumberjack",
            Self::Rock | Self::Gold => "Miner",
            Self::Food => "Farmer",
        }
    }

    /// Default probability (in thousandths) that a cell of this type holds a vein.
    #[must_use]
    pub const fn default_spawn_permille(self) -> u32 {
        match self {
            Self::Wood | Self::Rock | Self::Gold | Self::Food => 300,
        }
    }

    /// Default exclusive upper bound on a freshly generated vein.
    #[must_use]
    pub const fn default_max_vein_size(self) -> u32 {
        match self {
            Self::Wood | Self::Rock | Self::Gold | Self::Food => 3,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wood => "WOOD",
            Self::Rock => "ROCK",
            Self::Gold => "GOLD",
            Self::Food => "FOOD",
        };
        f.write_str(name)
    }
}

/// Job specialisation: a named set of resource targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Job {
    /// Works ROCK and GOLD.
    Miner,
    /// Works WOOD.
    Lumberjack,
    /// Works FOOD.
    Farmer,
}

impl Job {
    /// Every job, in lookup order.
    pub const ALL: [Self; 3] = [Self::Miner, Self::Lumberjack, Self::Farmer];

    /// Resources a tool for this job can mine.
    #[must_use]
    pub fn targets(self) -> Vec<ResourceType> {
        match self {
            Self::Miner => vec![ResourceType::Rock, ResourceType::Gold],
            Self::Lumberjack => vec![ResourceType::Wood],
            Self::Farmer => vec![ResourceType::Food],
        }
    }

    /// Job whose target set equals `targets`, ignoring order.
    #[must_use]
    pub fn from_targets(targets: &[ResourceType]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|job| same_targets(&job.targets(), targets))
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Miner => "Miner",
            Self::Lumberjack => "Lumberjack",
            Self::Farmer => "Farmer",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check whether two target lists contain the same resources, ignoring order.
#[must_use]
pub fn same_targets(a: &[ResourceType], b: &[ResourceType]) -> bool {
    a.len() == b.len() && a.iter().all(|t| b.contains(t))
}

/// Human-readable label for a target set.
///
/// Uses the matching job name when one exists, otherwise lists the targets.
#[must_use]
pub fn targets_label(targets: &[ResourceType]) -> String {
    if targets.is_empty() {
        return "Unemployed".to_string();
    }
    match Job::from_targets(targets) {
        Some(job) => job.name().to_string(),
        None => {
            let names: Vec<String> = targets.iter().map(ToString::to_string).collect();
            format!("[{}]", names.join(", "))
        }
    }
}
