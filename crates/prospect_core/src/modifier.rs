//! Unit modifiers and the stat effect pipeline.
//!
//! A modifier is plain data stored on its unit: a kind tag plus activation
//! state. What a modifier does to each stat is looked up in a fixed effect
//! table ([`effect`]), and [`compose`] applies a list of effects to a base
//! stat in two passes:
//!
//! 1. every multiplicative effect, in attachment order
//! 2. every additive effect, in attachment order
//!
//! Multipliers therefore never scale a flat bonus.

use serde::{Deserialize, Serialize};

use crate::config::ModifierConfig;
use crate::math::{scale_floor, Fixed};

/// Kind of modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Seasoned worker: mines and walks faster but eats more.
    Expert,
    /// Mounted worker: walks faster and pays a flat food surcharge.
    Rider,
}

impl ModifierKind {
    /// Single-character indicator shown next to a unit.
    #[must_use]
    pub const fn indicator(self) -> char {
        match self {
            Self::Expert => 'E',
            Self::Rider => 'R',
        }
    }
}

/// A unit stat that modifiers can alter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    /// Manhattan steps per turn.
    Speed,
    /// Food eaten per turn.
    Hunger,
    /// Resources mined per action.
    Efficiency,
}

/// A single stat contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Multiply the running value and floor.
    Multiply(Fixed),
    /// Add a flat amount.
    Add(u32),
}

impl Effect {
    /// Whether this effect belongs to the multiplicative pass.
    #[must_use]
    pub const fn is_multiplicative(self) -> bool {
        matches!(self, Self::Multiply(_))
    }

    /// Apply this effect to a value.
    #[must_use]
    pub fn apply(self, value: u32) -> u32 {
        match self {
            Self::Multiply(factor) => scale_floor(value, factor),
            Self::Add(amount) => value.saturating_add(amount),
        }
    }
}

/// Effect of a modifier kind on a stat, if it has one.
#[must_use]
pub fn effect(kind: ModifierKind, stat: Stat, config: &ModifierConfig) -> Option<Effect> {
    match (kind, stat) {
        (ModifierKind::Expert, Stat::Efficiency) => {
            Some(Effect::Multiply(config.expert_efficiency_multiplier))
        }
        (ModifierKind::Expert, Stat::Speed) => {
            Some(Effect::Multiply(config.expert_speed_multiplier))
        }
        (ModifierKind::Expert, Stat::Hunger) => {
            Some(Effect::Multiply(config.expert_hunger_multiplier))
        }
        (ModifierKind::Rider, Stat::Speed) => Some(Effect::Multiply(config.rider_speed_multiplier)),
        (ModifierKind::Rider, Stat::Hunger) => Some(Effect::Add(config.rider_hunger_increase)),
        (ModifierKind::Rider, Stat::Efficiency) => None,
    }
}

/// Apply effects to a base value: all multipliers first, then all additions.
#[must_use]
pub fn compose(base: u32, effects: &[Effect]) -> u32 {
    let multiplied = effects
        .iter()
        .filter(|e| e.is_multiplicative())
        .fold(base, |value, e| e.apply(value));
    effects
        .iter()
        .filter(|e| !e.is_multiplicative())
        .fold(multiplied, |value, e| e.apply(value))
}

/// Compute a stat from its base value and a unit's modifiers.
///
/// Only active modifiers contribute.
#[must_use]
pub fn modified_stat(base: u32, stat: Stat, modifiers: &[Modifier], config: &ModifierConfig) -> u32 {
    let effects: Vec<Effect> = modifiers
        .iter()
        .filter(|m| m.is_active())
        .filter_map(|m| effect(m.kind(), stat, config))
        .collect();
    compose(base, &effects)
}

/// A modifier attached to one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifier {
    kind: ModifierKind,
    active: bool,
    countdown: u32,
}

impl Modifier {
    /// Create an inactive modifier.
    #[must_use]
    pub const fn new(kind: ModifierKind, config: &ModifierConfig) -> Self {
        let countdown = match kind {
            ModifierKind::Expert => config.expert_deactivate_countdown,
            ModifierKind::Rider => 0,
        };
        Self {
            kind,
            active: false,
            countdown,
        }
    }

    /// Modifier kind.
    #[must_use]
    pub const fn kind(&self) -> ModifierKind {
        self.kind
    }

    /// Whether the modifier currently affects stats.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Turns left before an active Expert switches off.
    #[must_use]
    pub const fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Update activation state at the end of the owner's turn.
    ///
    /// # Arguments
    ///
    /// * `can_mine` - Whether the owner could act this turn
    /// * `xp` - The owner's experience after this turn
    /// * `config` - Modifier tuning
    pub fn update(&mut self, can_mine: bool, xp: u32, config: &ModifierConfig) {
        match self.kind {
            ModifierKind::Expert => {
                if self.active {
                    if can_mine {
                        self.countdown = config.expert_deactivate_countdown;
                    } else {
                        self.countdown = self.countdown.saturating_sub(1);
                        if self.countdown == 0 {
                            self.active = false;
                            self.countdown = config.expert_deactivate_countdown;
                        }
                    }
                } else if xp > config.expert_xp_threshold && can_mine {
                    self.active = true;
                }
            }
            ModifierKind::Rider => self.active = can_mine,
        }
    }
}
