//! Test fixtures and helpers.
//!
//! Hand-built worlds, units and simulations for consistent testing.
//! Grids are written as rows of whitespace-separated tokens: a resource
//! symbol followed by the vein size, e.g. `"W2 R0 G1"`.

use fixed::types::I32F32;
use prospect_core::actor::Actor;
use prospect_core::config::GameConfig;
use prospect_core::inventory::Inventory;
use prospect_core::resources::ResourceType;
use prospect_core::simulation::Simulation;
use prospect_core::tool::Tool;
use prospect_core::unit::{Unit, UnitId};
use prospect_core::world::WorldMap;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create the fixed-point ratio `num / den`.
#[must_use]
pub fn fixed_ratio(num: i32, den: i32) -> I32F32 {
    I32F32::from_num(num) / I32F32::from_num(den)
}

/// Default ruleset without starting units or default modifiers.
///
/// Keeps stats at their base values so tests can reason about them.
#[must_use]
pub fn plain_config(width: u32, height: u32) -> GameConfig {
    GameConfig {
        width,
        height,
        default_modifiers: Vec::new(),
        starting_units: Vec::new(),
        ..GameConfig::default()
    }
}

fn parse_token(token: &str) -> (ResourceType, u32) {
    let mut chars = token.chars();
    let symbol = chars.next().unwrap_or_else(|| panic!("empty cell token"));
    let resource = ResourceType::ALL
        .into_iter()
        .find(|r| r.symbol() == symbol)
        .unwrap_or_else(|| panic!("unknown resource symbol '{symbol}' in '{token}'"));
    let amount = chars
        .as_str()
        .parse()
        .unwrap_or_else(|_| panic!("bad vein size in '{token}'"));
    (resource, amount)
}

/// Build a world from rows of cell tokens.
///
/// # Panics
///
/// Panics on an unknown symbol, a malformed amount or ragged rows.
#[must_use]
pub fn grid(rows: &[&str]) -> WorldMap {
    let cells: Vec<Vec<(ResourceType, u32)>> = rows
        .iter()
        .map(|row| row.split_whitespace().map(parse_token).collect())
        .collect();
    let width = cells.first().map_or(0, Vec::len);
    assert!(
        cells.iter().all(|row| row.len() == width),
        "all grid rows must have the same width"
    );
    WorldMap::from_fn(width as u32, cells.len() as u32, |x, y| {
        cells[y as usize][x as usize]
    })
}

/// A unit with base stats and no modifiers.
#[must_use]
pub fn unit(id: u32, x: u32, y: u32) -> Unit {
    Unit::new(UnitId(id), x, y, &plain_config(1, 1))
}

/// A unit with base stats carrying a tool.
#[must_use]
pub fn unit_with_tool(id: u32, x: u32, y: u32, efficiency: u32, targets: &[ResourceType]) -> Unit {
    unit(id, x, y).with_tool(Tool::new(efficiency, targets.to_vec()))
}

/// An inventory holding the given amounts.
#[must_use]
pub fn inventory(amounts: &[(ResourceType, u32)]) -> Inventory {
    let mut inventory = Inventory::new();
    for &(resource, amount) in amounts {
        inventory.add(resource, amount);
    }
    inventory
}

/// A simulation over a hand-built grid with the given units and stock.
///
/// # Panics
///
/// Panics if the grid is empty.
#[must_use]
pub fn simulation(rows: &[&str], units: Vec<Unit>, stock: &[(ResourceType, u32)]) -> Simulation {
    let mut world = grid(rows);
    for unit in units {
        world.insert(Actor::Unit(unit));
    }
    let config = plain_config(world.width(), world.height());
    Simulation::from_parts(config, world, inventory(stock), 0)
        .unwrap_or_else(|e| panic!("fixture simulation rejected: {e}"))
}
