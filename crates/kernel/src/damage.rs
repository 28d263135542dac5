//! Damage state: shield, armor and structure as fractions of their maxima.

use serde::{Deserialize, Serialize};

use crate::item::InventoryItem;

/// Scale constant clients expect alongside the shield fraction.
pub const DAMAGE_TAU: f64 = 100_000.0;

/// Normalized damage summary sent with every add-ball.
///
/// Derived on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageState {
    pub shield: f64,
    pub tau: f64,
    /// Capture time in FILETIME units.
    pub timestamp: u64,
    pub armor: f64,
    pub structure: f64,
}

impl DamageState {
    /// Compute the damage state of `item` as of `timestamp`.
    pub fn of(item: &dyn InventoryItem, timestamp: u64) -> Self {
        Self {
            shield: ratio(item.shield_charge(), item.shield_capacity()),
            tau: DAMAGE_TAU,
            timestamp,
            armor: remaining(item.armor_damage(), item.armor_hp()),
            structure: remaining(item.hull_damage(), item.hull_hp()),
        }
    }

    /// State reported for an entity with no backing record.
    pub fn empty(timestamp: u64) -> Self {
        Self {
            shield: 0.0,
            tau: DAMAGE_TAU,
            timestamp,
            armor: 0.0,
            structure: 0.0,
        }
    }

    /// Nested tuple form used by the outer message: `((shield, tau, timestamp), armor, structure)`.
    pub fn wire_tuple(&self) -> ((f64, f64, u64), f64, f64) {
        ((self.shield, self.tau, self.timestamp), self.armor, self.structure)
    }
}

fn valid_denominator(d: f64) -> bool {
    d.is_finite() && d > 0.0
}

/// `num / den`, or 0 when the quotient would be undefined or infinite.
fn ratio(num: f64, den: f64) -> f64 {
    if valid_denominator(den) && num.is_finite() {
        num / den
    } else {
        0.0
    }
}

/// `1 - damage / hp`, or 0 when `hp` is not a usable maximum.
fn remaining(damage: f64, hp: f64) -> f64 {
    if valid_denominator(hp) && damage.is_finite() {
        1.0 - damage / hp
    } else {
        0.0
    }
}
