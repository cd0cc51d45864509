//! Game configuration.
//!
//! Every tunable constant of a game lives in [`GameConfig`]. The defaults
//! reproduce the standard ruleset; scenarios override individual fields.
//! Fractional values are fixed-point and serialize as raw bits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed};
use crate::modifier::ModifierKind;
use crate::resources::{ResourceBundle, ResourceType};

/// Spawn parameters for one resource type during world generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpawn {
    /// Probability in `[0, 1]` that a cell of this type holds a vein.
    #[serde(with = "fixed_serde")]
    pub spawn_chance: Fixed,
    /// Exclusive upper bound on a generated vein.
    pub max_vein_size: u32,
}

impl ResourceSpawn {
    /// Default spawn parameters for a resource type.
    #[must_use]
    pub fn defaults_for(resource: ResourceType) -> Self {
        Self {
            spawn_chance: Fixed::from_num(resource.default_spawn_permille())
                / Fixed::from_num(1000),
            max_vein_size: resource.default_max_vein_size(),
        }
    }
}

/// Tuning values for the modifier effect table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierConfig {
    /// Experience a unit must exceed before Expert can activate.
    pub expert_xp_threshold: u32,
    /// Consecutive non-mining turns before an active Expert switches off.
    pub expert_deactivate_countdown: u32,
    /// Expert speed multiplier.
    #[serde(with = "fixed_serde")]
    pub expert_speed_multiplier: Fixed,
    /// Expert efficiency multiplier.
    #[serde(with = "fixed_serde")]
    pub expert_efficiency_multiplier: Fixed,
    /// Expert hunger multiplier.
    #[serde(with = "fixed_serde")]
    pub expert_hunger_multiplier: Fixed,
    /// Rider speed multiplier.
    #[serde(with = "fixed_serde")]
    pub rider_speed_multiplier: Fixed,
    /// Flat hunger surcharge while riding.
    pub rider_hunger_increase: u32,
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            expert_xp_threshold: 10,
            expert_deactivate_countdown: 5,
            expert_speed_multiplier: Fixed::from_num(3) / Fixed::from_num(2),
            expert_efficiency_multiplier: Fixed::from_num(2),
            expert_hunger_multiplier: Fixed::from_num(2),
            rider_speed_multiplier: Fixed::from_num(2),
            rider_hunger_increase: 3,
        }
    }
}

/// Tool handed to a starting unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Mining efficiency.
    pub efficiency: u32,
    /// Resources the tool can mine.
    pub targets: Vec<ResourceType>,
}

/// A unit placed on the map when the game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Starting tool, if any.
    pub tool: Option<ToolSpec>,
}

/// Complete ruleset for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// FOOD in the inventory when the game starts.
    pub initial_food: u32,
    /// Price of purchasing any building.
    pub building_cost: ResourceBundle,
    /// Idle ticks between two production attempts of a building.
    pub production_interval: u32,
    /// Price a unit factory pays per spawned unit.
    pub unit_cost: ResourceBundle,
    /// Speed of a freshly created unit.
    pub unit_base_speed: u32,
    /// Hunger of a freshly created unit.
    pub unit_base_hunger: u32,
    /// Base price of a tool; upgrades scale it with the current efficiency.
    pub tool_cost: ResourceBundle,
    /// Efficiency of a newly produced tool.
    pub tool_base_efficiency: u32,
    /// Group efficiency bonus, applied once per qualifying member.
    #[serde(with = "fixed_serde")]
    pub group_efficiency_multiplier: Fixed,
    /// Modifier kinds attached to every new unit, in application order.
    pub default_modifiers: Vec<ModifierKind>,
    /// Modifier tuning.
    pub modifiers: ModifierConfig,
    /// Per-resource spawn parameters. Missing entries use the defaults.
    pub resource_spawn: BTreeMap<ResourceType, ResourceSpawn>,
    /// Units placed at game start.
    pub starting_units: Vec<UnitSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            initial_food: 30,
            building_cost: ResourceType::ALL.iter().map(|&r| (r, 10)).collect(),
            production_interval: 2,
            unit_cost: [(ResourceType::Food, 1), (ResourceType::Gold, 1)]
                .into_iter()
                .collect(),
            unit_base_speed: 3,
            unit_base_hunger: 1,
            tool_cost: [(ResourceType::Rock, 1), (ResourceType::Wood, 1)]
                .into_iter()
                .collect(),
            tool_base_efficiency: 1,
            group_efficiency_multiplier: Fixed::from_num(11) / Fixed::from_num(10),
            default_modifiers: vec![ModifierKind::Expert, ModifierKind::Rider],
            modifiers: ModifierConfig::default(),
            resource_spawn: ResourceType::ALL
                .iter()
                .map(|&r| (r, ResourceSpawn::defaults_for(r)))
                .collect(),
            starting_units: vec![
                UnitSpec {
                    x: 0,
                    y: 0,
                    tool: Some(ToolSpec {
                        efficiency: 2,
                        targets: vec![ResourceType::Wood, ResourceType::Rock],
                    }),
                },
                UnitSpec {
                    x: 0,
                    y: 0,
                    tool: Some(ToolSpec {
                        efficiency: 2,
                        targets: vec![ResourceType::Wood, ResourceType::Food],
                    }),
                },
            ],
        }
    }
}

impl GameConfig {
    /// Spawn parameters for a resource type.
    #[must_use]
    pub fn spawn_for(&self, resource: ResourceType) -> ResourceSpawn {
        self.resource_spawn
            .get(&resource)
            .copied()
            .unwrap_or_else(|| ResourceSpawn::defaults_for(resource))
    }

    /// Check that the configuration can produce a playable world.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.production_interval == 0 {
            return Err(GameError::InvalidConfig(
                "production_interval must be at least 1".to_string(),
            ));
        }
        if self.tool_base_efficiency == 0 {
            return Err(GameError::InvalidConfig(
                "tool_base_efficiency must be at least 1".to_string(),
            ));
        }
        for (resource, spawn) in &self.resource_spawn {
            if spawn.spawn_chance < Fixed::ZERO || spawn.spawn_chance > Fixed::ONE {
                return Err(GameError::InvalidConfig(format!(
                    "spawn chance for {resource} must be within [0, 1]"
                )));
            }
        }
        for unit in &self.starting_units {
            if unit.x >= self.width || unit.y >= self.height {
                return Err(GameError::InvalidConfig(format!(
                    "starting unit at ({}, {}) is outside the {}x{} grid",
                    unit.x, unit.y, self.width, self.height
                )));
            }
            if unit.tool.as_ref().is_some_and(|tool| tool.efficiency == 0) {
                return Err(GameError::InvalidConfig(format!(
                    "starting unit at ({}, {}) has a zero-efficiency tool",
                    unit.x, unit.y
                )));
            }
        }
        Ok(())
    }
}
