//! # Prospect Core
//!
//! Deterministic simulation core for the Prospect resource game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless batch runs
//! - Determinism testing
//! - Any front end (text, graphical) on top of the same rules
//!
//! ## Crate Structure
//!
//! - [`world`] / [`cell`] - The grid, its veins and nearest-cell search
//! - [`unit`] / [`actor`] - Workers and the groups they form
//! - [`modifier`] - Stat modifiers and the effect pipeline
//! - [`building`] - Unit and tool factories
//! - [`simulation`] - Turn orchestration and win/loss evaluation
//! - [`config`] - Every tunable constant
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actor;
pub mod building;
pub mod cell;
pub mod config;
pub mod error;
pub mod inventory;
pub mod math;
pub mod modifier;
pub mod resources;
pub mod rng;
pub mod simulation;
pub mod tool;
pub mod unit;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actor::{Actor, Group};
    pub use crate::building::{Building, BuildingKind, BuildingStatus};
    pub use crate::cell::Cell;
    pub use crate::config::{GameConfig, ModifierConfig, ResourceSpawn, ToolSpec, UnitSpec};
    pub use crate::error::{GameError, Result};
    pub use crate::inventory::Inventory;
    pub use crate::math::Fixed;
    pub use crate::modifier::{Modifier, ModifierKind, Stat};
    pub use crate::resources::{Job, ResourceBundle, ResourceType};
    pub use crate::rng::SimRng;
    pub use crate::simulation::{GameStatus, Simulation, TickEvent, TickSummary};
    pub use crate::tool::Tool;
    pub use crate::unit::{Unit, UnitAction, UnitId};
    pub use crate::world::WorldMap;
}
