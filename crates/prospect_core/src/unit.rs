//! Worker units.
//!
//! A unit's turn runs in a fixed order: eat, mine, move toward the nearest
//! minable vein if mining failed, then update modifiers. Units never insert
//! themselves into the world; the caller takes the owning actor out of its
//! cell, lets it act, and reinserts it at the unit's new position.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{GameConfig, ModifierConfig};
use crate::inventory::Inventory;
use crate::modifier::{modified_stat, Modifier, ModifierKind, Stat};
use crate::resources::ResourceType;
use crate::simulation::TickEvent;
use crate::tool::Tool;
use crate::world::WorldMap;

/// Stable identifier of a unit, unique within one game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A player-issued action for a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitAction {
    /// Mine the cell the unit stands on.
    Mine,
    /// Walk toward a cell. Coordinates are clamped into the grid.
    Move {
        /// Target column.
        x: i64,
        /// Target row.
        y: i64,
    },
}

/// A single worker on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    x: u32,
    y: u32,
    base_speed: u32,
    base_hunger: u32,
    xp: u32,
    can_mine: bool,
    has_played: bool,
    tool: Option<Tool>,
    modifiers: Vec<Modifier>,
}

impl Unit {
    /// Create a unit with the configured base stats and default modifiers.
    #[must_use]
    pub fn new(id: UnitId, x: u32, y: u32, config: &GameConfig) -> Self {
        Self {
            id,
            x,
            y,
            base_speed: config.unit_base_speed,
            base_hunger: config.unit_base_hunger,
            xp: 0,
            can_mine: true,
            has_played: false,
            tool: None,
            modifiers: config
                .default_modifiers
                .iter()
                .map(|&kind| Modifier::new(kind, &config.modifiers))
                .collect(),
        }
    }

    /// Builder: equip a tool.
    #[must_use]
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Builder: replace the modifier list.
    #[must_use]
    pub fn with_modifiers(mut self, kinds: &[ModifierKind], config: &ModifierConfig) -> Self {
        self.modifiers = kinds.iter().map(|&k| Modifier::new(k, config)).collect();
        self
    }

    /// Unit identifier.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Current cell as `(x, y)`.
    #[must_use]
    pub const fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub(crate) fn set_position(&mut self, x: u32, y: u32) {
        self.x = x;
        self.y = y;
    }

    /// Accumulated experience.
    #[must_use]
    pub const fn xp(&self) -> u32 {
        self.xp
    }

    /// Grant experience.
    pub fn add_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Whether the unit ate and may act this turn.
    #[must_use]
    pub const fn can_mine(&self) -> bool {
        self.can_mine
    }

    /// Override the eating result.
    pub fn set_can_mine(&mut self, can_mine: bool) {
        self.can_mine = can_mine;
    }

    /// Whether the unit already acted this tick.
    #[must_use]
    pub const fn has_played(&self) -> bool {
        self.has_played
    }

    /// Mark the unit as played or unplayed.
    pub fn set_has_played(&mut self, has_played: bool) {
        self.has_played = has_played;
    }

    /// Equipped tool.
    #[must_use]
    pub const fn tool(&self) -> Option<&Tool> {
        self.tool.as_ref()
    }

    /// Equip a tool, returning the one it replaces.
    pub fn equip(&mut self, tool: Tool) -> Option<Tool> {
        self.tool.replace(tool)
    }

    /// Attached modifiers, in attachment order.
    #[must_use]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Indicators of the currently active modifiers.
    #[must_use]
    pub fn active_indicators(&self) -> String {
        self.modifiers
            .iter()
            .filter(|m| m.is_active())
            .map(|m| m.kind().indicator())
            .collect()
    }

    /// Speed after active modifiers.
    #[must_use]
    pub fn speed(&self, config: &ModifierConfig) -> u32 {
        modified_stat(self.base_speed, Stat::Speed, &self.modifiers, config)
    }

    /// Hunger after active modifiers.
    #[must_use]
    pub fn hunger(&self, config: &ModifierConfig) -> u32 {
        modified_stat(self.base_hunger, Stat::Hunger, &self.modifiers, config)
    }

    /// Mining output for a resource after active modifiers.
    ///
    /// Zero when the unit has no tool for the resource.
    #[must_use]
    pub fn efficiency(&self, resource: ResourceType, config: &ModifierConfig) -> u32 {
        match &self.tool {
            Some(tool) if tool.can_mine(resource) => {
                modified_stat(tool.efficiency(), Stat::Efficiency, &self.modifiers, config)
            }
            _ => 0,
        }
    }

    /// Job label from the tool's target set.
    #[must_use]
    pub fn job_label(&self) -> String {
        self.tool
            .as_ref()
            .map_or_else(|| "Unemployed".to_string(), Tool::job_label)
    }

    /// Eat this turn's food.
    ///
    /// The unit may act only if the inventory holds at least its hunger in
    /// FOOD, in which case that food is consumed.
    ///
    /// # Returns
    ///
    /// Whether the unit ate.
    pub fn eat(&mut self, inventory: &mut Inventory, config: &ModifierConfig) -> bool {
        let hunger = self.hunger(config);
        self.can_mine = inventory.contains(ResourceType::Food, hunger);
        if self.can_mine {
            inventory.remove(ResourceType::Food, hunger);
        }
        self.can_mine
    }

    /// Mine the cell the unit stands on.
    ///
    /// Succeeds when the unit ate, its tool targets the cell's resource and
    /// the vein is not empty. Mined resources go to the inventory and the
    /// same amount is granted as experience.
    ///
    /// # Returns
    ///
    /// Whether the unit mined.
    pub fn mine(
        &mut self,
        world: &mut WorldMap,
        inventory: &mut Inventory,
        config: &ModifierConfig,
        events: &mut Vec<TickEvent>,
    ) -> bool {
        if !self.can_mine {
            return false;
        }
        let (resource, available) = {
            let cell = world.cell(self.x, self.y);
            (cell.resource(), cell.amount())
        };
        let has_tool = self.tool.as_ref().is_some_and(|t| t.can_mine(resource));
        if !has_tool || available == 0 {
            return false;
        }

        let efficiency = self.efficiency(resource, config);
        let amount = world.cell_mut(self.x, self.y).mine(efficiency);
        inventory.add(resource, amount);
        self.add_xp(amount);

        debug!(unit = %self.id, %resource, amount, x = self.x, y = self.y, "Unit mined");
        events.push(TickEvent::UnitMined {
            unit: self.id,
            resource,
            amount,
            x: self.x,
            y: self.y,
        });
        true
    }

    /// Walk toward a cell, at most `speed` Manhattan steps.
    ///
    /// Jumps straight to the target when it is within reach; otherwise steps
    /// along whichever axis has the larger remaining distance, preferring
    /// the y axis on ties. A unit that could not eat does not move.
    ///
    /// # Returns
    ///
    /// Whether the position changed.
    pub fn move_toward(&mut self, target_x: u32, target_y: u32, config: &ModifierConfig) -> bool {
        if !self.can_mine {
            return false;
        }
        let start = self.position();
        let speed = self.speed(config);
        let distance = self.x.abs_diff(target_x) + self.y.abs_diff(target_y);

        if distance <= speed {
            self.x = target_x;
            self.y = target_y;
        } else {
            for _ in 0..speed {
                if self.x.abs_diff(target_x) > self.y.abs_diff(target_y) {
                    self.x = step_toward(self.x, target_x);
                } else {
                    self.y = step_toward(self.y, target_y);
                }
            }
        }
        self.position() != start
    }

    /// Run every modifier's end-of-turn update.
    pub fn update_modifiers(&mut self, config: &ModifierConfig) {
        let (can_mine, xp) = (self.can_mine, self.xp);
        for modifier in &mut self.modifiers {
            modifier.update(can_mine, xp, config);
        }
    }

    /// Play the automatic turn routine.
    ///
    /// The world must not hold this unit while it plays.
    pub fn take_turn(
        &mut self,
        world: &mut WorldMap,
        inventory: &mut Inventory,
        config: &GameConfig,
        events: &mut Vec<TickEvent>,
    ) {
        let modifiers = &config.modifiers;
        if !self.eat(inventory, modifiers) {
            debug!(unit = %self.id, "Unit could not eat");
            events.push(TickEvent::UnitStarved { unit: self.id });
        }

        if !self.mine(world, inventory, modifiers, events) {
            let target = self
                .tool
                .as_ref()
                .and_then(|tool| world.find_closest_resource(tool.targets(), self.x, self.y));
            if let Some((x, y)) = target {
                self.walk(x, y, modifiers, events);
            }
        }

        self.update_modifiers(modifiers);
        self.has_played = true;
    }

    /// Play a player-chosen action instead of the automatic routine.
    ///
    /// The world must not hold this unit while it plays.
    pub fn perform(
        &mut self,
        action: UnitAction,
        world: &mut WorldMap,
        inventory: &mut Inventory,
        config: &GameConfig,
        events: &mut Vec<TickEvent>,
    ) {
        let modifiers = &config.modifiers;
        if !self.eat(inventory, modifiers) {
            events.push(TickEvent::UnitStarved { unit: self.id });
        }

        match action {
            UnitAction::Mine => {
                self.mine(world, inventory, modifiers, events);
            }
            UnitAction::Move { x, y } => {
                let (x, y) = world.clamp(x, y);
                self.walk(x, y, modifiers, events);
            }
        }

        self.update_modifiers(modifiers);
        self.has_played = true;
    }

    fn walk(&mut self, x: u32, y: u32, config: &ModifierConfig, events: &mut Vec<TickEvent>) {
        let from = self.position();
        if self.move_toward(x, y, config) {
            debug!(unit = %self.id, ?from, to = ?self.position(), "Unit moved");
            events.push(TickEvent::UnitMoved {
                unit: self.id,
                from,
                to: self.position(),
            });
        }
    }
}

fn step_toward(value: u32, target: u32) -> u32 {
    if target > value {
        value + 1
    } else {
        value.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig {
            default_modifiers: Vec::new(),
            ..GameConfig::default()
        }
    }

    fn wood_world() -> WorldMap {
        WorldMap::from_fn(5, 5, |x, y| {
            if (x, y) == (4, 0) {
                (ResourceType::Wood, 3)
            } else {
                (ResourceType::Rock, 0)
            }
        })
    }

    fn fed_inventory() -> Inventory {
        let mut inventory = Inventory::default();
        inventory.add(ResourceType::Food, 100);
        inventory
    }

    #[test]
    fn test_eat_consumes_hunger() {
        let config = config();
        let mut unit = Unit::new(UnitId(0), 0, 0, &config);
        let mut inventory = fed_inventory();

        assert!(unit.eat(&mut inventory, &config.modifiers));
        assert_eq!(inventory.amount(ResourceType::Food), 99);
    }

    #[test]
    fn test_eat_without_food_blocks_action() {
        let config = config();
        let mut unit = Unit::new(UnitId(0), 0, 0, &config);
        let mut inventory = Inventory::default();

        assert!(!unit.eat(&mut inventory, &config.modifiers));
        assert!(!unit.can_mine());
        assert_eq!(inventory.amount(ResourceType::Food), 0);
    }

    #[test]
    fn test_mine_clamps_to_vein() {
        let config = config();
        let mut world = wood_world();
        let mut inventory = Inventory::default();
        let mut events = Vec::new();
        let mut unit =
            Unit::new(UnitId(0), 4, 0, &config).with_tool(Tool::new(5, vec![ResourceType::Wood]));

        assert!(unit.mine(&mut world, &mut inventory, &config.modifiers, &mut events));
        assert_eq!(inventory.amount(ResourceType::Wood), 3);
        assert_eq!(unit.xp(), 3);
        assert_eq!(world.cell(4, 0).amount(), 0);

        assert!(!unit.mine(&mut world, &mut inventory, &config.modifiers, &mut events));
    }

    #[test]
    fn test_mine_requires_matching_tool() {
        let config = config();
        let mut world = wood_world();
        let mut inventory = Inventory::default();
        let mut events = Vec::new();
        let mut unit =
            Unit::new(UnitId(0), 4, 0, &config).with_tool(Tool::new(1, vec![ResourceType::Gold]));

        assert!(!unit.mine(&mut world, &mut inventory, &config.modifiers, &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn test_move_within_reach_jumps() {
        let config = config();
        let mut unit = Unit::new(UnitId(0), 0, 0, &config);
        assert!(unit.move_toward(2, 1, &config.modifiers));
        assert_eq!(unit.position(), (2, 1));
    }

    #[test]
    fn test_move_steps_larger_axis_first() {
        let config = config();
        let mut unit = Unit::new(UnitId(0), 0, 0, &config);
        // distance 6, speed 3: dx=4 > dy=2 -> x, then dx=3 > 2 -> x, then tie 2/2 -> y
        unit.move_toward(4, 2, &config.modifiers);
        assert_eq!(unit.position(), (2, 1));
    }

    #[test]
    fn test_move_tie_prefers_y() {
        let config = config();
        let mut unit = Unit::new(UnitId(0), 0, 0, &config);
        // dx=dy=4: y, then dx=4 > dy=3 -> x, then tie 3/3 -> y
        unit.move_toward(4, 4, &config.modifiers);
        assert_eq!(unit.position(), (1, 2));
    }

    #[test]
    fn test_starving_unit_does_not_move() {
        let config = config();
        let mut unit = Unit::new(UnitId(0), 0, 0, &config);
        unit.set_can_mine(false);
        assert!(!unit.move_toward(1, 0, &config.modifiers));
        assert_eq!(unit.position(), (0, 0));
    }

    #[test]
    fn test_turn_walks_to_nearest_vein() {
        let config = config();
        let mut world = wood_world();
        let mut inventory = fed_inventory();
        let mut events = Vec::new();
        let mut unit =
            Unit::new(UnitId(0), 0, 0, &config).with_tool(Tool::new(1, vec![ResourceType::Wood]));

        unit.take_turn(&mut world, &mut inventory, &config, &mut events);
        assert_eq!(unit.position(), (3, 0));
        assert!(unit.has_played());

        unit.take_turn(&mut world, &mut inventory, &config, &mut events);
        assert_eq!(unit.position(), (4, 0));

        unit.take_turn(&mut world, &mut inventory, &config, &mut events);
        assert_eq!(inventory.amount(ResourceType::Wood), 1);
    }

    #[test]
    fn test_perform_move_clamps_target() {
        let config = config();
        let mut world = wood_world();
        let mut inventory = fed_inventory();
        let mut events = Vec::new();
        let mut unit = Unit::new(UnitId(0), 0, 0, &config);

        unit.perform(
            UnitAction::Move { x: -10, y: 1 },
            &mut world,
            &mut inventory,
            &config,
            &mut events,
        );
        assert_eq!(unit.position(), (0, 1));
        assert!(unit.has_played());
    }

    #[test]
    fn test_expert_activates_after_threshold() {
        let config = GameConfig {
            default_modifiers: vec![ModifierKind::Expert],
            ..GameConfig::default()
        };
        let mut world = WorldMap::from_fn(1, 1, |_, _| (ResourceType::Wood, 100));
        let mut inventory = fed_inventory();
        let mut events = Vec::new();
        let mut unit =
            Unit::new(UnitId(0), 0, 0, &config).with_tool(Tool::new(4, vec![ResourceType::Wood]));

        // 4 xp per turn: 4, 8, 12 > 10
        for _ in 0..3 {
            unit.take_turn(&mut world, &mut inventory, &config, &mut events);
        }
        assert!(unit.modifiers()[0].is_active());
        assert_eq!(unit.efficiency(ResourceType::Wood, &config.modifiers), 8);
        assert_eq!(unit.hunger(&config.modifiers), 2);
        assert_eq!(unit.speed(&config.modifiers), 4);
        assert_eq!(unit.active_indicators(), "E");
    }

    #[test]
    fn test_job_label() {
        let config = config();
        let unit = Unit::new(UnitId(0), 0, 0, &config);
        assert_eq!(unit.job_label(), "Unemployed");
        let unit = unit.with_tool(Tool::new(1, vec![ResourceType::Wood]));
        assert_eq!(unit.job_label(), "Lumberjack");
    }
}
