//! Grid cells.

use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::resources::ResourceType;

/// One tile of the world map: a resource vein and at most one occupant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    x: u32,
    y: u32,
    resource: ResourceType,
    amount: u32,
    occupant: Option<Actor>,
}

impl Cell {
    /// Create an unoccupied cell.
    #[must_use]
    pub const fn new(x: u32, y: u32, resource: ResourceType, amount: u32) -> Self {
        Self {
            x,
            y,
            resource,
            amount,
            occupant: None,
        }
    }

    /// Column.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Row.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Resource type of the vein.
    #[must_use]
    pub const fn resource(&self) -> ResourceType {
        self.resource
    }

    /// Remaining vein size.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Whether the vein is exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.amount == 0
    }

    /// Unit or group standing here.
    #[must_use]
    pub const fn occupant(&self) -> Option<&Actor> {
        self.occupant.as_ref()
    }

    pub(crate) fn occupant_mut(&mut self) -> Option<&mut Actor> {
        self.occupant.as_mut()
    }

    /// Whether nobody stands here.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// Remove up to `amount` from the vein.
    ///
    /// Returns the quantity actually removed, `min(remaining, amount)`.
    pub fn mine(&mut self, amount: u32) -> u32 {
        let mined = amount.min(self.amount);
        self.amount -= mined;
        mined
    }

    /// Put an actor on this cell, merging with any current occupant.
    ///
    /// # Returns
    ///
    /// The group size if a merge happened.
    pub(crate) fn insert(&mut self, mut actor: Actor) -> Option<usize> {
        actor.set_position(self.x, self.y);
        match self.occupant.take() {
            None => {
                self.occupant = Some(actor);
                None
            }
            Some(existing) => {
                let merged = existing.merge(actor);
                let size = merged.len();
                self.occupant = Some(merged);
                Some(size)
            }
        }
    }

    pub(crate) fn take_occupant(&mut self) -> Option<Actor> {
        self.occupant.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::unit::{Unit, UnitId};

    fn unit(id: u32) -> Actor {
        Actor::Unit(Unit::new(UnitId(id), 0, 0, &GameConfig::default()))
    }

    #[test]
    fn test_mine_returns_min() {
        let mut cell = Cell::new(0, 0, ResourceType::Gold, 3);
        assert_eq!(cell.mine(2), 2);
        assert_eq!(cell.amount(), 1);
        assert_eq!(cell.mine(5), 1);
        assert_eq!(cell.amount(), 0);
        assert_eq!(cell.mine(5), 0);
        assert!(cell.is_depleted());
    }

    #[test]
    fn test_insert_into_empty_cell() {
        let mut cell = Cell::new(2, 1, ResourceType::Wood, 0);
        assert_eq!(cell.insert(unit(0)), None);
        assert_eq!(cell.occupant().map(Actor::position), Some((2, 1)));
    }

    #[test]
    fn test_insert_into_occupied_cell_groups() {
        let mut cell = Cell::new(2, 1, ResourceType::Wood, 0);
        cell.insert(unit(0));
        assert_eq!(cell.insert(unit(1)), Some(2));
        assert_eq!(cell.insert(unit(2)), Some(3));
        assert!(matches!(cell.occupant(), Some(Actor::Group(g)) if g.len() == 3));
    }

    #[test]
    fn test_take_occupant_clears() {
        let mut cell = Cell::new(0, 0, ResourceType::Wood, 0);
        cell.insert(unit(0));
        assert!(cell.take_occupant().is_some());
        assert!(cell.is_empty());
    }
}
