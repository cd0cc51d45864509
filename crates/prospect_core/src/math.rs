//! Fixed-point math utilities for deterministic simulation.
//!
//! Stat multipliers and spawn probabilities are fractional, but the
//! simulation never touches floating point: every fractional value is an
//! [`I32F32`] and every result is floored back to an integer stat.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Multiply an integer stat by a fixed-point factor and floor the result.
///
/// Saturates instead of overflowing and never returns a negative value.
#[must_use]
pub fn scale_floor(value: u32, factor: Fixed) -> u32 {
    let scaled = Fixed::saturating_from_num(value).saturating_mul(factor);
    clamp_to_u32(scaled.floor().to_num::<i64>())
}

/// Raise a fixed-point factor to an integer power.
#[must_use]
pub fn pow(factor: Fixed, exponent: usize) -> Fixed {
    (0..exponent).fold(Fixed::ONE, |acc, _| acc.saturating_mul(factor))
}

/// Clamp a signed intermediate value into the `u32` stat range.
#[must_use]
pub fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}
