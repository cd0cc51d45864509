//! Buildings and their production cycle.
//!
//! A building idles for `production_interval` ticks, then attempts to
//! produce and starts the next cycle regardless of the outcome:
//!
//! - a unit factory spends `unit_cost` to spawn a unit at a random cell,
//!   equipped for the factory's job
//! - a tool factory equips the first toolless unit, or else upgrades the
//!   weakest tool of the factory's job by one efficiency level

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actor::Actor;
use crate::config::GameConfig;
use crate::inventory::Inventory;
use crate::resources::{targets_label, ResourceBundle, ResourceType};
use crate::rng::SimRng;
use crate::simulation::TickEvent;
use crate::tool::Tool;
use crate::unit::Unit;
use crate::world::WorldMap;

/// What a building produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Spawns new units.
    UnitFactory,
    /// Equips and upgrades tools.
    ToolFactory,
}

impl BuildingKind {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnitFactory => "Unit factory",
            Self::ToolFactory => "Tool factory",
        }
    }
}

/// Outcome of the building's most recent tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingStatus {
    /// Counting down, or nothing to work on.
    InProgress,
    /// Produced on the last attempt.
    Produced,
    /// The last attempt could not be paid for.
    NotEnoughResources,
}

impl BuildingStatus {
    /// Human-readable status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Produced => "produced last turn",
            Self::NotEnoughResources => "not enough resources",
        }
    }
}

/// A purchased building.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    kind: BuildingKind,
    targets: Vec<ResourceType>,
    status: BuildingStatus,
    countdown: u32,
}

impl Building {
    /// Create a building specialised for a target set.
    #[must_use]
    pub fn new(kind: BuildingKind, targets: Vec<ResourceType>, config: &GameConfig) -> Self {
        Self {
            kind,
            targets,
            status: BuildingStatus::InProgress,
            countdown: config.production_interval,
        }
    }

    /// Building kind.
    #[must_use]
    pub const fn kind(&self) -> BuildingKind {
        self.kind
    }

    /// Job specialisation.
    #[must_use]
    pub fn targets(&self) -> &[ResourceType] {
        &self.targets
    }

    /// Status after the last tick.
    #[must_use]
    pub const fn status(&self) -> BuildingStatus {
        self.status
    }

    /// Idle ticks left before the next attempt.
    #[must_use]
    pub const fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Advance one tick of the production cycle.
    ///
    /// # Arguments
    ///
    /// * `index` - Position of this building in purchase order, for events
    /// * `world` - Map to spawn into or search for tool recipients
    /// * `inventory` - Resource ledger to pay from
    /// * `config` - Costs and base stats
    /// * `rng` - Spawn position source
    /// * `events` - Tick event sink
    pub(crate) fn produce(
        &mut self,
        index: usize,
        world: &mut WorldMap,
        inventory: &mut Inventory,
        config: &GameConfig,
        rng: &mut SimRng,
        events: &mut Vec<TickEvent>,
    ) {
        if self.countdown > 0 {
            self.countdown -= 1;
            self.status = BuildingStatus::InProgress;
            return;
        }
        self.countdown = config.production_interval;

        self.status = match self.kind {
            BuildingKind::UnitFactory => self.produce_unit(world, inventory, config, rng, events),
            BuildingKind::ToolFactory => self.produce_tool(world, inventory, config, events),
        };
        if self.status == BuildingStatus::NotEnoughResources {
            debug!(building = index, kind = self.kind.name(), "Production blocked");
            events.push(TickEvent::ProductionBlocked { building: index });
        }
    }

    fn produce_unit(
        &self,
        world: &mut WorldMap,
        inventory: &mut Inventory,
        config: &GameConfig,
        rng: &mut SimRng,
        events: &mut Vec<TickEvent>,
    ) -> BuildingStatus {
        if !inventory.contains_all(&config.unit_cost) {
            return BuildingStatus::NotEnoughResources;
        }
        inventory.remove_all(&config.unit_cost);

        let x = rng.next_below(world.width());
        let y = rng.next_below(world.height());
        let id = world.allocate_unit_id();
        let mut unit = Unit::new(id, x, y, config);
        if !self.targets.is_empty() {
            unit.equip(Tool::new(config.tool_base_efficiency, self.targets.clone()));
        }

        info!(unit = %id, x, y, job = %unit.job_label(), "Unit spawned");
        events.push(TickEvent::UnitSpawned { unit: id, x, y });
        world.place(Actor::Unit(unit), events);
        BuildingStatus::Produced
    }

    fn produce_tool(
        &self,
        world: &mut WorldMap,
        inventory: &mut Inventory,
        config: &GameConfig,
        events: &mut Vec<TickEvent>,
    ) -> BuildingStatus {
        let toolless = world
            .units()
            .find(|u| u.tool().is_none())
            .map(Unit::id);
        if let Some(id) = toolless {
            if !inventory.contains_all(&config.tool_cost) {
                return BuildingStatus::NotEnoughResources;
            }
            inventory.remove_all(&config.tool_cost);
            let efficiency = config.tool_base_efficiency;
            if let Some(unit) = world.unit_mut(id) {
                unit.equip(Tool::new(efficiency, self.targets.clone()));
            }
            info!(unit = %id, efficiency, "Tool equipped");
            events.push(TickEvent::ToolEquipped {
                unit: id,
                efficiency,
            });
            return BuildingStatus::Produced;
        }

        let weakest = world
            .units()
            .filter_map(|u| {
                u.tool()
                    .filter(|t| t.has_targets(&self.targets))
                    .map(|t| (u.id(), t.efficiency()))
            })
            .min_by_key(|&(_, efficiency)| efficiency);
        let Some((id, current)) = weakest else {
            return BuildingStatus::InProgress;
        };

        let cost = upgrade_cost(&config.tool_cost, current);
        if !inventory.contains_all(&cost) {
            return BuildingStatus::NotEnoughResources;
        }
        inventory.remove_all(&cost);

        let efficiency = current.saturating_add(1);
        let recipient = world
            .actor_of_mut(id)
            .and_then(|actor| actor.assign_tool(Tool::new(efficiency, self.targets.clone())))
            .unwrap_or(id);
        info!(unit = %recipient, efficiency, "Tool upgraded");
        events.push(TickEvent::ToolUpgraded {
            unit: recipient,
            efficiency,
        });
        BuildingStatus::Produced
    }
}

/// Price of upgrading a tool of efficiency `current`: `base * current + 1`
/// of each resource.
#[must_use]
pub fn upgrade_cost(base: &ResourceBundle, current: u32) -> ResourceBundle {
    base.iter()
        .map(|(&resource, &amount)| (resource, amount.saturating_mul(current).saturating_add(1)))
        .collect()
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.kind.name(),
            targets_label(&self.targets),
            self.status.label()
        )
    }
}
