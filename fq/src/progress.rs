//! Persisted progress and the metrics derived from it
//!
//! `ProgressState` is a value: every toggle returns a new state and leaves the
//! input untouched. Only checked bullets are stored, so toggling a bullet twice
//! gives back a state equal to the one you started with.
//!
//! A record holding explicit `false` bullets (older writers stored unchecked
//! boxes) sanitizes to a different state, so it is rewritten once on load.
//! The record has exactly two fields; anything else makes it malformed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Catalog;

/// Completed steps and per-step bullet state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProgressState {
    /// Ids of steps marked done
    #[serde(default)]
    pub done_steps: BTreeSet<String>,

    /// step id -> bullet index -> checked
    #[serde(default)]
    pub checklist: BTreeMap<String, BTreeMap<u32, bool>>,
}

impl ProgressState {
    pub fn is_done(&self, id: &str) -> bool {
        self.done_steps.contains(id)
    }

    pub fn is_checked(&self, id: &str, index: u32) -> bool {
        self.checklist
            .get(id)
            .and_then(|bullets| bullets.get(&index))
            .copied()
            .unwrap_or(false)
    }

    /// Bullet state for one step, if any bullet was ever checked
    pub fn bullets(&self, id: &str) -> Option<&BTreeMap<u32, bool>> {
        self.checklist.get(id)
    }

    /// New state with `id` added to or removed from the done set
    pub fn toggled_done(&self, id: &str) -> Self {
        let mut next = self.clone();
        if !next.done_steps.remove(id) {
            next.done_steps.insert(id.to_string());
        }
        debug!(id, done = next.is_done(id), "ProgressState::toggled_done");
        next
    }

    /// New state with the bullet at `index` of step `id` flipped
    ///
    /// A missing entry counts as unchecked, so the first toggle checks it.
    pub fn toggled_bullet(&self, id: &str, index: u32) -> Self {
        let mut next = self.clone();
        let checked = !self.is_checked(id, index);
        let bullets = next.checklist.entry(id.to_string()).or_default();
        if checked {
            bullets.insert(index, true);
        } else {
            bullets.remove(&index);
            if bullets.is_empty() {
                next.checklist.remove(id);
            }
        }
        debug!(id, index, checked, "ProgressState::toggled_bullet");
        next
    }

    /// Drop everything that no longer matches the catalog
    ///
    /// Removes unknown step ids from both fields, bullet indices past the end
    /// of their step's bullet list, and unchecked entries.
    pub fn sanitized(&self, catalog: &Catalog) -> Self {
        let done_steps = self
            .done_steps
            .iter()
            .filter(|id| catalog.contains(id))
            .cloned()
            .collect();

        let checklist = self
            .checklist
            .iter()
            .filter_map(|(id, bullets)| {
                let step = catalog.get(id)?;
                let kept: BTreeMap<u32, bool> = bullets
                    .iter()
                    .filter(|(index, checked)| **checked && (**index as usize) < step.bullets.len())
                    .map(|(index, checked)| (*index, *checked))
                    .collect();
                (!kept.is_empty()).then(|| (id.clone(), kept))
            })
            .collect();

        Self { done_steps, checklist }
    }
}

/// Percent complete and the completion flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMetrics {
    /// Done steps that exist in the catalog
    pub completed: usize,
    /// Number of catalog steps
    pub total: usize,
    /// 0..=100
    pub percent: u8,
    pub all_complete: bool,
}

impl ProgressMetrics {
    pub fn compute(state: &ProgressState, catalog: &Catalog) -> Self {
        let completed = catalog.ids().filter(|id| state.is_done(id)).count();
        let total = catalog.len();
        let ratio = completed as f64 / total.max(1) as f64;
        let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
        Self {
            completed,
            total,
            percent,
            all_complete: completed == total,
        }
    }
}
