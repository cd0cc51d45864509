//! Error types for the game simulation.

use thiserror::Error;

use crate::resources::ResourceType;
use crate::simulation::GameStatus;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all rejected commands.
///
/// Running out of resources during production is not an error; it is
/// reported through [`BuildingStatus`](crate::building::BuildingStatus).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The selected unit index does not exist in the flattened unit list.
    #[error("Unit index {index} out of range ({count} units)")]
    UnitIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of units currently on the map.
        count: usize,
    },

    /// Insufficient resources to purchase something.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource type.
        resource: ResourceType,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// A command was issued after the game ended.
    #[error("Game is over: {0}")]
    GameOver(GameStatus),

    /// The game configuration cannot produce a playable world.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
