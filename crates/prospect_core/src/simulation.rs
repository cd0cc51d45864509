//! Turn orchestration.
//!
//! A [`Simulation`] owns the whole game state and advances it one tick at a
//! time. Every tick runs the same phases in the same order:
//!
//! 1. every unit that has not played yet runs its turn, cells in row-major
//!    order and group members in joining order
//! 2. `has_played` is cleared for the next tick
//! 3. every building advances its production cycle, in purchase order
//! 4. the game status is evaluated
//!
//! # Determinism
//!
//! The simulation never reads system randomness or floating point. World
//! generation and spawn positions draw from a seeded [`SimRng`], so the same
//! seed and the same commands always produce the same [`state_hash`].
//!
//! [`state_hash`]: Simulation::state_hash
//!
//! # Example
//!
//! ```
//! use prospect_core::config::GameConfig;
//! use prospect_core::simulation::{GameStatus, Simulation};
//!
//! let mut sim = Simulation::new(GameConfig::default(), 42).unwrap();
//! let summary = sim.advance_turn_automatic().unwrap();
//! assert_eq!(summary.tick, 1);
//! assert_eq!(sim.tick(), 1);
//! assert!(matches!(
//!     summary.status,
//!     GameStatus::Running | GameStatus::Won | GameStatus::Lost
//! ));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::actor::Actor;
use crate::building::{Building, BuildingKind};
use crate::cell::Cell;
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::inventory::Inventory;
use crate::resources::{Job, ResourceType};
use crate::rng::SimRng;
use crate::tool::Tool;
use crate::unit::{Unit, UnitAction, UnitId};
use crate::world::{UnitLocation, WorldMap};

/// Overall game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The game goes on.
    Running,
    /// Every vein is exhausted.
    Won,
    /// No unit can mine any more.
    Lost,
}

impl GameStatus {
    /// Whether the game has ended.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "RUNNING",
            Self::Won => "WON",
            Self::Lost => "LOST",
        };
        f.write_str(name)
    }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickEvent {
    /// A unit mined its cell.
    UnitMined {
        /// Miner.
        unit: UnitId,
        /// Resource mined.
        resource: ResourceType,
        /// Amount added to the inventory.
        amount: u32,
        /// Column of the mined cell.
        x: u32,
        /// Row of the mined cell.
        y: u32,
    },
    /// A unit changed cell.
    UnitMoved {
        /// Walker.
        unit: UnitId,
        /// Previous cell.
        from: (u32, u32),
        /// New cell.
        to: (u32, u32),
    },
    /// Units merged on a cell.
    GroupFormed {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// Members after the merge.
        size: usize,
    },
    /// A group fell below two members.
    GroupDissolved {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },
    /// A unit found too little food and skipped its action.
    UnitStarved {
        /// Hungry unit.
        unit: UnitId,
    },
    /// A unit factory produced a unit.
    UnitSpawned {
        /// New unit.
        unit: UnitId,
        /// Spawn column.
        x: u32,
        /// Spawn row.
        y: u32,
    },
    /// A tool factory equipped a toolless unit.
    ToolEquipped {
        /// Recipient.
        unit: UnitId,
        /// Efficiency of the new tool.
        efficiency: u32,
    },
    /// A tool factory upgraded a tool.
    ToolUpgraded {
        /// Recipient.
        unit: UnitId,
        /// Efficiency after the upgrade.
        efficiency: u32,
    },
    /// A building could not pay for production.
    ProductionBlocked {
        /// Building index in purchase order.
        building: usize,
    },
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Tick number just completed, starting at 1.
    pub tick: u64,
    /// Status after the tick.
    pub status: GameStatus,
    /// Events in the order they happened.
    pub events: Vec<TickEvent>,
}

impl TickSummary {
    /// Total resources mined this tick.
    #[must_use]
    pub fn mined(&self) -> u64 {
        self.events
            .iter()
            .map(|event| match event {
                TickEvent::UnitMined { amount, .. } => u64::from(*amount),
                _ => 0,
            })
            .sum()
    }
}

/// The game simulation.
///
/// Owns the world, the inventory and the random source. Every command goes
/// through this type, so the world and the inventory are only ever touched
/// through their own add/remove/insert operations.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: GameConfig,
    world: WorldMap,
    inventory: Inventory,
    rng: SimRng,
    /// Completed ticks.
    tick: u64,
    status: GameStatus,
}

impl Simulation {
    /// Start a new game.
    ///
    /// Generates the map from `seed`, places the starting units (merging
    /// units that share a cell) and stocks the initial food.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = SimRng::new(seed);
        let mut world = WorldMap::generate(&config, &mut rng);

        for spec in &config.starting_units {
            let id = world.allocate_unit_id();
            let mut unit = Unit::new(id, spec.x, spec.y, &config);
            if let Some(tool) = &spec.tool {
                unit.equip(Tool::new(tool.efficiency, tool.targets.clone()));
            }
            world.insert(Actor::Unit(unit));
        }

        let mut inventory = Inventory::new();
        inventory.add(ResourceType::Food, config.initial_food);

        info!(
            seed,
            width = config.width,
            height = config.height,
            units = world.unit_count(),
            "Simulation created"
        );
        Ok(Self {
            config,
            world,
            inventory,
            rng,
            tick: 0,
            status: GameStatus::Running,
        })
    }

    /// Assemble a simulation from a prepared world and inventory.
    ///
    /// `seed` only drives spawn positions; the world is used as given.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the configuration is invalid.
    pub fn from_parts(
        config: GameConfig,
        world: WorldMap,
        inventory: Inventory,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            world,
            inventory,
            rng: SimRng::new(seed),
            tick: 0,
            status: GameStatus::Running,
        })
    }

    /// Ruleset of this game.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The map.
    #[must_use]
    pub const fn world(&self) -> &WorldMap {
        &self.world
    }

    /// The resource ledger and buildings.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Completed ticks.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Status after the last tick.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Grid dimensions as `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.world.width(), self.world.height())
    }

    /// Cell at signed coordinates, clamped into the grid.
    #[must_use]
    pub fn cell(&self, x: i64, y: i64) -> &Cell {
        self.world.get_cell(x, y)
    }

    /// Every unit on the map, group members included.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.world.units()
    }

    /// Inventory amount of a resource.
    #[must_use]
    pub fn resource_amount(&self, resource: ResourceType) -> u32 {
        self.inventory.amount(resource)
    }

    /// Buildings in purchase order.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        self.inventory.buildings()
    }

    /// Human-readable status line of every building.
    #[must_use]
    pub fn building_descriptions(&self) -> Vec<String> {
        self.buildings().iter().map(ToString::to_string).collect()
    }

    /// Play one tick in which every unit runs its automatic routine.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] once the game is won or lost.
    pub fn advance_turn_automatic(&mut self) -> Result<TickSummary> {
        self.ensure_running()?;
        self.world.clear_has_played();
        let mut events = Vec::new();
        self.play_pending_units(&mut events);
        Ok(self.finish_tick(events))
    }

    /// Play one tick in which one unit performs a chosen action.
    ///
    /// `unit_index` indexes the flattened unit list (see [`units`]). The
    /// chosen unit eats, performs `action` and updates its modifiers; every
    /// other unit then runs its automatic routine.
    ///
    /// [`units`]: Self::units
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] once the game is won or lost, and
    /// [`GameError::UnitIndexOutOfRange`] for an unknown unit.
    pub fn advance_turn_manual(
        &mut self,
        unit_index: usize,
        action: UnitAction,
    ) -> Result<TickSummary> {
        self.ensure_running()?;
        let location = self
            .world
            .locate(unit_index)
            .ok_or_else(|| GameError::UnitIndexOutOfRange {
                index: unit_index,
                count: self.world.unit_count(),
            })?;

        let mut events = Vec::new();
        self.play_selected(location, action, &mut events);
        self.play_pending_units(&mut events);
        Ok(self.finish_tick(events))
    }

    /// Buy a building, paying the configured building cost.
    ///
    /// `job` sets the building's target resources; `None` builds an
    /// unspecialised factory.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientResources`] naming the first
    /// missing resource, or [`GameError::GameOver`] once the game ended.
    pub fn purchase_building(&mut self, kind: BuildingKind, job: Option<Job>) -> Result<()> {
        self.ensure_running()?;
        if let Some((resource, required, available)) =
            self.inventory.shortfall(&self.config.building_cost)
        {
            return Err(GameError::InsufficientResources {
                resource,
                required,
                available,
            });
        }
        self.inventory.remove_all(&self.config.building_cost);

        let targets = job.map(Job::targets).unwrap_or_default();
        let building = Building::new(kind, targets, &self.config);
        info!(%building, "Building purchased");
        self.inventory.add_building(building);
        Ok(())
    }

    /// Evaluate the win/loss condition of the current state.
    ///
    /// WON when every vein is empty, otherwise LOST when no unit can mine.
    #[must_use]
    pub fn evaluate_status(&self) -> GameStatus {
        if self.world.all_depleted() {
            GameStatus::Won
        } else if !self.world.any_can_mine() {
            GameStatus::Lost
        } else {
            GameStatus::Running
        }
    }

    /// Hash of the complete game state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.status.hash(&mut hasher);
        self.rng.hash(&mut hasher);
        self.world.hash(&mut hasher);
        self.inventory.hash(&mut hasher);
        hasher.finish()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.status.is_over() {
            return Err(GameError::GameOver(self.status));
        }
        Ok(())
    }

    /// Take the selected unit out of its cell, play the chosen action and
    /// put it back. A unit that stays keeps its place in its group.
    fn play_selected(
        &mut self,
        location: UnitLocation,
        action: UnitAction,
        events: &mut Vec<TickEvent>,
    ) {
        let UnitLocation { x, y, member } = location;
        let Some(actor) = self.world.take(x, y) else {
            return;
        };
        let mut members = actor.into_units();
        let was_group = members.len() > 1;
        let mut unit = members.remove(member.min(members.len() - 1));
        let remaining = members.len();
        if let Some(rest) = Actor::from_units(x, y, members) {
            self.world.insert(rest);
        }

        debug!(unit = %unit.id(), ?action, "Manual action");
        unit.perform(action, &mut self.world, &mut self.inventory, &self.config, events);

        if unit.position() == (x, y) {
            let mut members = self.world.take(x, y).map(Actor::into_units).unwrap_or_default();
            members.insert(member.min(members.len()), unit);
            if let Some(actor) = Actor::from_units(x, y, members) {
                self.world.insert(actor);
            }
        } else {
            if was_group && remaining < 2 {
                events.push(TickEvent::GroupDissolved { x, y });
            }
            self.world.place(Actor::Unit(unit), events);
        }
    }

    /// Check occupancy invariants after a tick.
    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        for cell in self.world.cells() {
            if let Some(actor) = cell.occupant() {
                assert!(!actor.is_empty(), "empty actor at ({}, {})", cell.x(), cell.y());
                if let Actor::Group(group) = actor {
                    assert!(group.len() > 1, "single-member group at ({}, {})", cell.x(), cell.y());
                }
                for unit in actor.units() {
                    assert_eq!(unit.position(), (cell.x(), cell.y()), "unit {} off its cell", unit.id());
                }
            }
        }
    }

    fn play_pending_units(&mut self, events: &mut Vec<TickEvent>) {
        for y in 0..self.world.height() {
            for x in 0..self.world.width() {
                let pending = self
                    .world
                    .cell(x, y)
                    .occupant()
                    .is_some_and(|actor| actor.units().iter().any(|u| !u.has_played()));
                if !pending {
                    continue;
                }
                if let Some(actor) = self.world.take(x, y) {
                    actor.play(&mut self.world, &mut self.inventory, &self.config, events);
                }
            }
        }
    }

    fn run_production(&mut self, events: &mut Vec<TickEvent>) {
        let mut buildings = self.inventory.take_buildings();
        for (index, building) in buildings.iter_mut().enumerate() {
            building.produce(
                index,
                &mut self.world,
                &mut self.inventory,
                &self.config,
                &mut self.rng,
                events,
            );
        }
        self.inventory.restore_buildings(buildings);
    }

    fn finish_tick(&mut self, mut events: Vec<TickEvent>) -> TickSummary {
        self.world.clear_has_played();
        self.run_production(&mut events);
        self.status = self.evaluate_status();
        self.tick += 1;

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();

        trace!(tick = self.tick, hash = self.state_hash(), "Tick complete");
        if self.status.is_over() {
            info!(tick = self.tick, status = %self.status, "Game over");
        }
        TickSummary {
            tick: self.tick,
            status: self.status,
            events,
        }
    }
}
