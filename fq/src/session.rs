//! One user's quest session
//!
//! Wires the UI entry points (toggle a step, toggle a bullet, edit the name,
//! trigger the reveal) to the store and recomputes the fortunes explicitly
//! after each change.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::steps::checklist_complete;
use crate::{
    Catalog, DEFAULT_PREDICTION_COUNT, Locale, ProgressMetrics, ProgressPort, ProgressStore, RevealGate, RevealWheel,
    Spin, StoreError, derive_predictions,
};

/// Session settings that do not change during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub name: String,
    pub locale: Locale,
    pub prediction_count: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            locale: Locale::default(),
            prediction_count: DEFAULT_PREDICTION_COUNT,
        }
    }
}

/// Render data for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub id: String,
    pub title: String,
    pub done: bool,
    /// Checked flag per bullet, in bullet order
    pub bullets: Vec<bool>,
    /// Every bullet checked but the step itself not marked done
    pub ready_to_mark: bool,
}

/// Store, name, fortunes and the last reveal result
#[derive(Debug)]
pub struct QuestSession<P: ProgressPort> {
    store: ProgressStore<P>,
    name: String,
    locale: Locale,
    prediction_count: usize,
    predictions: Vec<String>,
    wheel: RevealWheel,
    result: Option<String>,
}

impl<P: ProgressPort> QuestSession<P> {
    /// Load progress from `port` and compute the first fortunes
    pub fn open(port: P, catalog: Catalog, options: SessionOptions) -> Self {
        let store = ProgressStore::load(port, catalog);
        let mut session = Self {
            store,
            name: options.name,
            locale: options.locale,
            prediction_count: options.prediction_count,
            predictions: Vec::new(),
            wheel: RevealWheel::new(),
            result: None,
        };
        session.refresh_predictions();
        session
    }

    pub fn on_toggle_done(&mut self, id: &str) -> Result<(), StoreError> {
        let outcome = self.store.toggle_done(id).map(|_| ());
        // a failed write still changed memory
        self.refresh_predictions();
        outcome
    }

    pub fn on_toggle_bullet(&mut self, id: &str, index: u32) -> Result<(), StoreError> {
        self.store.toggle_bullet(id, index).map(|_| ())
    }

    pub fn on_name_change(&mut self, name: &str) {
        if self.name != name {
            self.name = name.to_string();
            self.refresh_predictions();
        }
    }

    /// Spin the wheel if unlocked; the result is fixed at trigger time
    pub fn on_reveal_trigger<R: Rng>(&mut self, rng: &mut R) -> Option<Spin> {
        let gate = self.gate();
        let spin = self.wheel.spin(gate, &self.predictions, rng)?;
        self.result = Some(spin.result.clone());
        Some(spin)
    }

    pub fn store(&self) -> &ProgressStore<P> {
        &self.store
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> ProgressMetrics {
        self.store.metrics()
    }

    pub fn percent(&self) -> u8 {
        self.metrics().percent
    }

    pub fn all_complete(&self) -> bool {
        self.metrics().all_complete
    }

    pub fn gate(&self) -> RevealGate {
        RevealGate::from_completion(self.all_complete())
    }

    pub fn predictions(&self) -> &[String] {
        &self.predictions
    }

    pub fn reveal_result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Per-step render data in catalog order
    pub fn step_statuses(&self) -> Vec<StepStatus> {
        let state = self.store.state();
        self.store
            .catalog()
            .iter()
            .map(|step| {
                let done = state.is_done(&step.id);
                let bullets = (0..step.bullets.len())
                    .map(|i| u32::try_from(i).is_ok_and(|i| state.is_checked(&step.id, i)))
                    .collect();
                StepStatus {
                    id: step.id.clone(),
                    title: step.title.clone(),
                    done,
                    bullets,
                    ready_to_mark: !done && checklist_complete(step, state.bullets(&step.id)),
                }
            })
            .collect()
    }

    fn refresh_predictions(&mut self) {
        self.predictions = derive_predictions(
            self.store.state(),
            self.store.catalog(),
            &self.name,
            self.locale,
            self.prediction_count,
        );
        debug!(count = self.predictions.len(), "QuestSession: predictions refreshed");
    }
}
