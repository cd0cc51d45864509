//! Cell occupants: single units and groups.
//!
//! An [`Actor`] is whatever occupies a cell. A [`Group`] forms whenever a
//! unit enters an occupied cell and aggregates its members' stats. Groups
//! never nest: merging two groups concatenates their member lists.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GameConfig;
use crate::inventory::Inventory;
use crate::math::{pow, scale_floor};
use crate::resources::ResourceType;
use crate::simulation::TickEvent;
use crate::tool::Tool;
use crate::unit::{Unit, UnitId};
use crate::world::WorldMap;

/// Several units sharing one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    x: u32,
    y: u32,
    members: Vec<Unit>,
}

impl Group {
    /// Members in joining order.
    #[must_use]
    pub fn members(&self) -> &[Unit] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Combined efficiency for a resource.
    ///
    /// Sums the efficiency of every member that can mine and holds a tool
    /// for the resource, then applies the group multiplier once per such
    /// member and floors the result.
    #[must_use]
    pub fn efficiency(&self, resource: ResourceType, config: &GameConfig) -> u32 {
        let qualifying: Vec<&Unit> = self
            .members
            .iter()
            .filter(|u| u.can_mine())
            .filter(|u| u.tool().is_some_and(|t| t.can_mine(resource)))
            .collect();
        let total: u32 = qualifying
            .iter()
            .map(|u| u.efficiency(resource, &config.modifiers))
            .sum();
        scale_floor(
            total,
            pow(config.group_efficiency_multiplier, qualifying.len()),
        )
    }

    /// Hand a tool to the member holding the weakest tool with the same
    /// target set. Toolless members are never chosen.
    ///
    /// # Returns
    ///
    /// The member that received the tool, or `None` if no member matched.
    pub fn assign_tool(&mut self, tool: Tool) -> Option<UnitId> {
        let recipient = self
            .members
            .iter_mut()
            .filter(|u| u.tool().is_some_and(|t| t.has_targets(tool.targets())))
            .min_by_key(|u| u.tool().map_or(0, Tool::efficiency))?;
        recipient.equip(tool);
        Some(recipient.id())
    }

    /// Play every member that has not acted yet, then reorganise.
    ///
    /// Members that walked away are inserted at their new cells. Members
    /// that could not eat split off to the nearest empty cell other than
    /// the group's own; with nowhere to go they stay. The group dissolves
    /// when fewer than two members are left on its cell, and none clears
    /// the cell.
    fn play(
        self,
        world: &mut WorldMap,
        inventory: &mut Inventory,
        config: &GameConfig,
        events: &mut Vec<TickEvent>,
    ) {
        let (x, y) = (self.x, self.y);
        let mut members = self.members;
        let was_group = members.len() > 1;

        for member in members.iter_mut().filter(|u| !u.has_played()) {
            member.take_turn(world, inventory, config, events);
        }

        let mut stayers = Vec::new();
        let mut movers = Vec::new();
        let mut starving = Vec::new();
        for member in members {
            if member.position() != (x, y) {
                movers.push(member);
            } else if !member.can_mine() {
                starving.push(member);
            } else {
                stayers.push(member);
            }
        }

        for member in movers {
            world.place(Actor::Unit(member), events);
        }

        for mut member in starving {
            let target = world.bfs_find(x, y, |cell| {
                cell.is_empty() && (cell.x(), cell.y()) != (x, y)
            });
            let Some((to_x, to_y)) = target else {
                stayers.push(member);
                continue;
            };
            member.set_position(to_x, to_y);
            events.push(TickEvent::UnitMoved {
                unit: member.id(),
                from: (x, y),
                to: (to_x, to_y),
            });
            world.place(Actor::Unit(member), events);
        }

        let remaining = stayers.len();
        if let Some(actor) = Actor::from_units(x, y, stayers) {
            world.place(actor, events);
        }
        if was_group && remaining < 2 {
            debug!(x, y, remaining, "Group dissolved");
            events.push(TickEvent::GroupDissolved { x, y });
        }
    }
}

/// The occupant of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// A lone unit.
    Unit(Unit),
    /// Two or more units sharing the cell.
    Group(Group),
}

impl Actor {
    /// Build the occupant for a set of units standing on one cell.
    ///
    /// Returns `None` for no units and a plain unit for exactly one.
    #[must_use]
    pub fn from_units(x: u32, y: u32, mut units: Vec<Unit>) -> Option<Self> {
        for unit in &mut units {
            unit.set_position(x, y);
        }
        match units.len() {
            0 => None,
            1 => units.pop().map(Self::Unit),
            _ => Some(Self::Group(Group {
                x,
                y,
                members: units,
            })),
        }
    }

    /// Merge another actor into this one, flattening groups.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let (x, y) = self.position();
        let mut members = self.into_units();
        members.extend(other.into_units());
        for member in &mut members {
            member.set_position(x, y);
        }
        Self::Group(Group { x, y, members })
    }

    /// Current cell as `(x, y)`.
    #[must_use]
    pub fn position(&self) -> (u32, u32) {
        match self {
            Self::Unit(unit) => unit.position(),
            Self::Group(group) => (group.x, group.y),
        }
    }

    pub(crate) fn set_position(&mut self, x: u32, y: u32) {
        match self {
            Self::Unit(unit) => unit.set_position(x, y),
            Self::Group(group) => {
                group.x = x;
                group.y = y;
                for member in &mut group.members {
                    member.set_position(x, y);
                }
            }
        }
    }

    /// Units in this actor, in order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        match self {
            Self::Unit(unit) => std::slice::from_ref(unit),
            Self::Group(group) => &group.members,
        }
    }

    /// Mutable units in this actor, in order.
    pub fn units_mut(&mut self) -> &mut [Unit] {
        match self {
            Self::Unit(unit) => std::slice::from_mut(unit),
            Self::Group(group) => &mut group.members,
        }
    }

    /// Consume the actor into its units.
    #[must_use]
    pub fn into_units(self) -> Vec<Unit> {
        match self {
            Self::Unit(unit) => vec![unit],
            Self::Group(group) => group.members,
        }
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units().len()
    }

    /// Whether this actor holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units().is_empty()
    }

    /// Speed: the slowest member's speed.
    #[must_use]
    pub fn speed(&self, config: &GameConfig) -> u32 {
        self.units()
            .iter()
            .map(|u| u.speed(&config.modifiers))
            .min()
            .unwrap_or(0)
    }

    /// Hunger: the sum of member hunger.
    #[must_use]
    pub fn hunger(&self, config: &GameConfig) -> u32 {
        self.units()
            .iter()
            .map(|u| u.hunger(&config.modifiers))
            .sum()
    }

    /// Experience: the sum of member experience.
    #[must_use]
    pub fn xp(&self) -> u32 {
        self.units().iter().map(Unit::xp).sum()
    }

    /// Grant experience to every member.
    pub fn add_xp(&mut self, amount: u32) {
        for unit in self.units_mut() {
            unit.add_xp(amount);
        }
    }

    /// Whether any member can mine.
    #[must_use]
    pub fn can_mine(&self) -> bool {
        self.units().iter().any(Unit::can_mine)
    }

    /// Mining output for a resource.
    #[must_use]
    pub fn efficiency(&self, resource: ResourceType, config: &GameConfig) -> u32 {
        match self {
            Self::Unit(unit) => unit.efficiency(resource, &config.modifiers),
            Self::Group(group) => group.efficiency(resource, config),
        }
    }

    /// Job label: the unit's job or "Group".
    #[must_use]
    pub fn job_label(&self) -> String {
        match self {
            Self::Unit(unit) => unit.job_label(),
            Self::Group(_) => "Group".to_string(),
        }
    }

    /// Give a tool to this actor.
    ///
    /// A lone unit always takes it; a group routes it as in
    /// [`Group::assign_tool`].
    pub fn assign_tool(&mut self, tool: Tool) -> Option<UnitId> {
        match self {
            Self::Unit(unit) => {
                unit.equip(tool);
                Some(unit.id())
            }
            Self::Group(group) => group.assign_tool(tool),
        }
    }

    /// Play this actor's automatic turn and put the result back on the map.
    ///
    /// The actor must already have been taken out of its cell.
    pub(crate) fn play(
        self,
        world: &mut WorldMap,
        inventory: &mut Inventory,
        config: &GameConfig,
        events: &mut Vec<TickEvent>,
    ) {
        match self {
            Self::Unit(mut unit) => {
                if !unit.has_played() {
                    unit.take_turn(world, inventory, config, events);
                }
                world.place(Self::Unit(unit), events);
            }
            Self::Group(group) => group.play(world, inventory, config, events),
        }
    }
}
