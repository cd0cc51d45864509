//! The world map: a dense grid of cells.
//!
//! Cells are stored in row-major order and every lookup clamps its
//! coordinates into the grid, so there is no out-of-bounds access path.
//! Nearest-cell queries share one breadth-first search that scans
//! neighbours left, right, up, down.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::Actor;
use crate::cell::Cell;
use crate::config::GameConfig;
use crate::math::scale_floor;
use crate::resources::ResourceType;
use crate::rng::SimRng;
use crate::simulation::TickEvent;
use crate::unit::{Unit, UnitId};

/// Where a unit of the flattened unit list currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitLocation {
    /// Column of the occupied cell.
    pub x: u32,
    /// Row of the occupied cell.
    pub y: u32,
    /// Index of the unit inside the cell's actor.
    pub member: usize,
}

/// The game grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldMap {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Cells in row-major order.
    cells: Vec<Cell>,
    /// Next identifier handed to a new unit.
    next_unit_id: u32,
}

impl WorldMap {
    /// Build a map by asking `fill` for the vein of every cell.
    ///
    /// Dimensions below 1 are raised to 1.
    #[must_use]
    pub fn from_fn<F>(width: u32, height: u32, mut fill: F) -> Self
    where
        F: FnMut(u32, u32) -> (ResourceType, u32),
    {
        let width = width.max(1);
        let height = height.max(1);
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                let (resource, amount) = fill(x, y);
                cells.push(Cell::new(x, y, resource, amount));
            }
        }
        Self {
            width,
            height,
            cells,
            next_unit_id: 0,
        }
    }

    /// Generate a random map.
    ///
    /// Each cell draws a uniformly random resource type. With that type's
    /// spawn chance it receives a vein of `floor(r * max_vein_size)` for a
    /// fresh uniform `r`; otherwise the vein is empty.
    #[must_use]
    pub fn generate(config: &GameConfig, rng: &mut SimRng) -> Self {
        let kinds = ResourceType::ALL.len() as u32;
        Self::from_fn(config.width, config.height, |_, _| {
            let resource = ResourceType::ALL[rng.next_below(kinds) as usize];
            let spawn = config.spawn_for(resource);
            let amount = if rng.next_unit() < spawn.spawn_chance {
                scale_floor(spawn.max_vein_size, rng.next_unit())
            } else {
                0
            };
            (resource, amount)
        })
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Clamp signed coordinates into the grid.
    #[must_use]
    pub fn clamp(&self, x: i64, y: i64) -> (u32, u32) {
        let clamp_axis = |value: i64, size: u32| {
            u32::try_from(value.clamp(0, i64::from(size) - 1)).unwrap_or(0)
        };
        (clamp_axis(x, self.width), clamp_axis(y, self.height))
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Cell at signed coordinates, clamped into the grid.
    #[must_use]
    pub fn get_cell(&self, x: i64, y: i64) -> &Cell {
        let (x, y) = self.clamp(x, y);
        self.cell(x, y)
    }

    /// Cell at grid coordinates, clamped into the grid.
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    /// Mutable cell at grid coordinates, clamped into the grid.
    pub fn cell_mut(&mut self, x: u32, y: u32) -> &mut Cell {
        let index = self.index(x, y);
        &mut self.cells[index]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Put an actor on the cell at its position, merging with any occupant.
    ///
    /// # Returns
    ///
    /// The resulting group size if the actor merged into an occupied cell.
    pub fn insert(&mut self, actor: Actor) -> Option<usize> {
        for unit in actor.units() {
            self.next_unit_id = self.next_unit_id.max(unit.id().0.saturating_add(1));
        }
        let (x, y) = actor.position();
        self.cell_mut(x, y).insert(actor)
    }

    /// Insert units one by one at their own positions.
    pub fn insert_units(&mut self, units: Vec<Unit>) {
        for unit in units {
            self.insert(Actor::Unit(unit));
        }
    }

    /// Insert an actor and report any group it forms.
    pub(crate) fn place(&mut self, actor: Actor, events: &mut Vec<TickEvent>) {
        let (x, y) = actor.position();
        if let Some(size) = self.insert(actor) {
            debug!(x, y, size, "Group formed");
            events.push(TickEvent::GroupFormed { x, y, size });
        }
    }

    /// Remove and return the occupant of a cell.
    pub(crate) fn take(&mut self, x: u32, y: u32) -> Option<Actor> {
        self.cell_mut(x, y).take_occupant()
    }

    /// Reserve a fresh unit identifier.
    pub fn allocate_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id = self.next_unit_id.saturating_add(1);
        id
    }

    /// Breadth-first search from a cell for the first cell matching `predicate`.
    ///
    /// The origin itself is tested first. Neighbours are discovered left,
    /// right, up, down and every cell is visited at most once.
    ///
    /// # Returns
    ///
    /// Coordinates of the first match in discovery order, or `None`.
    pub fn bfs_find<P>(&self, x: u32, y: u32, predicate: P) -> Option<(u32, u32)>
    where
        P: Fn(&Cell) -> bool,
    {
        let (x, y) = (x.min(self.width - 1), y.min(self.height - 1));
        let mut visited = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();
        visited[self.index(x, y)] = true;
        queue.push_back((x, y));

        while let Some((cx, cy)) = queue.pop_front() {
            if predicate(self.cell(cx, cy)) {
                return Some((cx, cy));
            }
            let neighbours = [
                (cx > 0).then(|| (cx - 1, cy)),
                (cx + 1 < self.width).then(|| (cx + 1, cy)),
                (cy > 0).then(|| (cx, cy - 1)),
                (cy + 1 < self.height).then(|| (cx, cy + 1)),
            ];
            for (nx, ny) in neighbours.into_iter().flatten() {
                let index = self.index(nx, ny);
                if !visited[index] {
                    visited[index] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
        None
    }

    /// Nearest cell holding a non-empty vein of one of `targets`.
    #[must_use]
    pub fn find_closest_resource(
        &self,
        targets: &[ResourceType],
        x: u32,
        y: u32,
    ) -> Option<(u32, u32)> {
        self.bfs_find(x, y, |cell| {
            !cell.is_depleted() && targets.contains(&cell.resource())
        })
    }

    /// Nearest unoccupied cell.
    #[must_use]
    pub fn find_closest_empty(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        self.bfs_find(x, y, Cell::is_empty)
    }

    /// Every unit on the map: row-major cells, group members in order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.cells
            .iter()
            .filter_map(Cell::occupant)
            .flat_map(Actor::units)
    }

    /// Number of units on the map, counting group members.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units().count()
    }

    /// Locate the unit at `index` of the flattened unit list.
    #[must_use]
    pub fn locate(&self, index: usize) -> Option<UnitLocation> {
        let mut remaining = index;
        for cell in &self.cells {
            let Some(actor) = cell.occupant() else {
                continue;
            };
            if remaining < actor.len() {
                return Some(UnitLocation {
                    x: cell.x(),
                    y: cell.y(),
                    member: remaining,
                });
            }
            remaining -= actor.len();
        }
        None
    }

    /// Mutable access to a unit by identifier.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.cells
            .iter_mut()
            .filter_map(Cell::occupant_mut)
            .flat_map(Actor::units_mut)
            .find(|u| u.id() == id)
    }

    /// Mutable access to the actor containing a unit.
    pub(crate) fn actor_of_mut(&mut self, id: UnitId) -> Option<&mut Actor> {
        self.cells
            .iter_mut()
            .filter_map(Cell::occupant_mut)
            .find(|actor| actor.units().iter().any(|u| u.id() == id))
    }

    /// Clear the turn-local `has_played` flag of every unit.
    pub fn clear_has_played(&mut self) {
        for cell in &mut self.cells {
            if let Some(actor) = cell.occupant_mut() {
                for unit in actor.units_mut() {
                    unit.set_has_played(false);
                }
            }
        }
    }

    /// Whether every vein is exhausted.
    #[must_use]
    pub fn all_depleted(&self) -> bool {
        self.cells.iter().all(Cell::is_depleted)
    }

    /// Total resources left in all veins.
    #[must_use]
    pub fn remaining_resources(&self) -> u64 {
        self.cells.iter().map(|c| u64::from(c.amount())).sum()
    }

    /// Whether any unit, including group members, can mine.
    #[must_use]
    pub fn any_can_mine(&self) -> bool {
        self.units().any(Unit::can_mine)
    }
}
