//! Reveal gate and fortune wheel
//!
//! The gate is derived from progress and never stored: it unlocks the moment
//! every step is done and locks again if a step is unmarked. The result of a
//! spin is fixed when it is triggered; any spinning animation is cosmetic.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Full turns the wheel makes before settling
const EXTRA_TURNS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealGate {
    Locked,
    Unlocked,
}

impl RevealGate {
    pub fn from_completion(all_complete: bool) -> Self {
        if all_complete { Self::Unlocked } else { Self::Locked }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked)
    }
}

/// Outcome of one spin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spin {
    /// Slice the pointer lands on
    pub index: usize,
    pub result: String,
    /// Accumulated wheel rotation in degrees after this spin
    pub rotation: f64,
}

/// Wheel with one slice per item, pointer at 0 degrees
#[derive(Debug, Clone, Default)]
pub struct RevealWheel {
    rotation: f64,
}

impl RevealWheel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Pick a slice uniformly and turn the wheel so it ends under the pointer
    ///
    /// Returns `None` while the gate is locked or there is nothing to pick.
    pub fn spin<R: Rng>(&mut self, gate: RevealGate, items: &[String], rng: &mut R) -> Option<Spin> {
        if !gate.is_unlocked() || items.is_empty() {
            debug!(?gate, items = items.len(), "RevealWheel::spin: ignored");
            return None;
        }

        let index = rng.random_range(0..items.len());
        let slice = 360.0 / items.len() as f64;
        let target_center = index as f64 * slice + slice / 2.0;
        // restart from a whole turn so earlier spins do not skew the landing
        let base = (self.rotation / 360.0).ceil() * 360.0;
        self.rotation = base + EXTRA_TURNS * 360.0 + (360.0 - target_center);

        debug!(index, rotation = self.rotation, "RevealWheel::spin: landed");
        Some(Spin {
            index,
            result: items[index].clone(),
            rotation: self.rotation,
        })
    }
}
