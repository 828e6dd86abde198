//! ProgressStore: the single owner of completion state
//!
//! Loading never fails: a missing, unreadable or malformed record becomes an
//! empty state. Every mutation is written through to the port immediately.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{Catalog, ProgressMetrics, ProgressPort, ProgressState, StorageError};

/// Errors from store mutations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Step {step} has {len} bullets, index {index} is out of range")]
    BulletOutOfRange { step: String, index: u32, len: usize },

    #[error("Failed to persist progress: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to serialize progress: {0}")]
    Json(#[from] serde_json::Error),
}

/// Progress state bound to a catalog and a storage port
#[derive(Debug)]
pub struct ProgressStore<P: ProgressPort> {
    port: P,
    catalog: Catalog,
    state: ProgressState,
}

impl<P: ProgressPort> ProgressStore<P> {
    /// Load, sanitize, and write back if sanitizing changed anything
    pub fn load(port: P, catalog: Catalog) -> Self {
        let loaded = read_state(&port);
        let state = loaded.sanitized(&catalog);

        let mut store = Self { port, catalog, state };
        if store.state != loaded {
            info!(
                before = loaded.done_steps.len(),
                after = store.state.done_steps.len(),
                "Dropped stale progress entries"
            );
            if let Err(e) = store.persist() {
                warn!("Failed to rewrite sanitized progress: {}", e);
            }
        }
        store
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn metrics(&self) -> ProgressMetrics {
        ProgressMetrics::compute(&self.state, &self.catalog)
    }

    /// Mark step `id` done, or not done if it already was
    pub fn toggle_done(&mut self, id: &str) -> Result<&ProgressState, StoreError> {
        if !self.catalog.contains(id) {
            return Err(StoreError::UnknownStep(id.to_string()));
        }
        self.state = self.state.toggled_done(id);
        self.persist()?;
        Ok(&self.state)
    }

    /// Flip bullet `index` of step `id`
    pub fn toggle_bullet(&mut self, id: &str, index: u32) -> Result<&ProgressState, StoreError> {
        let step = self
            .catalog
            .get(id)
            .ok_or_else(|| StoreError::UnknownStep(id.to_string()))?;
        if index as usize >= step.bullets.len() {
            return Err(StoreError::BulletOutOfRange {
                step: id.to_string(),
                index,
                len: step.bullets.len(),
            });
        }
        self.state = self.state.toggled_bullet(id, index);
        self.persist()?;
        Ok(&self.state)
    }

    /// Overwrite the stored record with the current state
    ///
    /// On failure the in-memory state is kept; the next successful write
    /// catches storage up.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.state)?;
        self.port.write(&raw)?;
        debug!(bytes = raw.len(), "ProgressStore::persist");
        Ok(())
    }
}

fn read_state<P: ProgressPort>(port: &P) -> ProgressState {
    let raw = match port.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No stored progress, starting empty");
            return ProgressState::default();
        }
        Err(e) => {
            warn!("Failed to read stored progress, starting empty: {}", e);
            return ProgressState::default();
        }
    };

    match serde_json::from_str::<ProgressState>(&raw) {
        Ok(state) => state,
        Err(e) => {
            warn!("Stored progress is malformed, starting empty: {}", e);
            ProgressState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileStorage, MemoryStorage};
    use tempfile::TempDir;

    #[test]
    fn test_load_empty_storage() {
        let store = ProgressStore::load(MemoryStorage::new(), Catalog::builtin());
        assert_eq!(store.state(), &ProgressState::default());
        assert_eq!(store.port().writes(), 0);
    }

    #[test]
    fn test_load_malformed_records() {
        for raw in [
            "",
            "not json",
            "null",
            "42",
            "[]",
            r#"{"doneSteps":"email","checklist":{}}"#,
            r#"{"doneSteps":[],"checklist":{"email":{"zero":true}}}"#,
            r#"{"doneSteps":[],"checklist":{"email":{"0":"yes"}}}"#,
        ] {
            let store = ProgressStore::load(MemoryStorage::with_record(raw), Catalog::builtin());
            assert_eq!(store.state(), &ProgressState::default(), "record {:?}", raw);
        }
    }

    #[test]
    fn test_load_missing_fields_default() {
        let store = ProgressStore::load(MemoryStorage::with_record(r#"{"doneSteps":["email"]}"#), Catalog::builtin());
        assert!(store.state().is_done("email"));
        assert!(store.state().checklist.is_empty());
        assert_eq!(store.port().writes(), 0);
    }

    #[test]
    fn test_load_drops_ghost_step_and_rewrites() {
        let store = ProgressStore::load(
            MemoryStorage::with_record(r#"{"doneSteps":["ghost-step"],"checklist":{}}"#),
            Catalog::builtin(),
        );
        assert_eq!(store.state(), &ProgressState::default());
        assert_eq!(store.port().writes(), 1);
        assert_eq!(store.port().record(), Some(r#"{"doneSteps":[],"checklist":{}}"#));
    }

    #[test]
    fn test_load_record_with_extra_field_is_malformed() {
        let store = ProgressStore::load(
            MemoryStorage::with_record(r#"{"doneSteps":["email"],"checklist":{},"junk":1}"#),
            Catalog::builtin(),
        );
        assert_eq!(store.state(), &ProgressState::default());
        assert_eq!(store.port().writes(), 0);
    }

    #[test]
    fn test_load_unchecked_bullets_rewritten_once() {
        let store = ProgressStore::load(
            MemoryStorage::with_record(r#"{"doneSteps":[],"checklist":{"clubs":{"0":false}}}"#),
            Catalog::builtin(),
        );
        assert_eq!(store.state(), &ProgressState::default());
        assert_eq!(store.port().writes(), 1);
        assert_eq!(store.port().record(), Some(r#"{"doneSteps":[],"checklist":{}}"#));
    }

    #[test]
    fn test_load_clean_record_not_rewritten() {
        let store = ProgressStore::load(
            MemoryStorage::with_record(r#"{"doneSteps":["email"],"checklist":{"clubs":{"1":true}}}"#),
            Catalog::builtin(),
        );
        assert!(store.state().is_done("email"));
        assert!(store.state().is_checked("clubs", 1));
        assert_eq!(store.port().writes(), 0);
    }

    #[test]
    fn test_toggles_write_through() {
        let mut store = ProgressStore::load(MemoryStorage::new(), Catalog::builtin());
        store.toggle_done("email").unwrap();
        store.toggle_bullet("clubs", 0).unwrap();
        assert_eq!(store.port().writes(), 2);
        assert_eq!(
            store.port().record(),
            Some(r#"{"doneSteps":["email"],"checklist":{"clubs":{"0":true}}}"#)
        );
    }

    #[test]
    fn test_toggle_rejects_unknown_step() {
        let mut store = ProgressStore::load(MemoryStorage::new(), Catalog::builtin());
        assert!(matches!(store.toggle_done("ghost"), Err(StoreError::UnknownStep(_))));
        assert!(matches!(store.toggle_bullet("ghost", 0), Err(StoreError::UnknownStep(_))));
        assert_eq!(store.port().writes(), 0);
    }

    #[test]
    fn test_toggle_rejects_bullet_out_of_range() {
        let mut store = ProgressStore::load(MemoryStorage::new(), Catalog::builtin());
        let err = store.toggle_bullet("clubs", 3).unwrap_err();
        assert!(matches!(err, StoreError::BulletOutOfRange { len: 3, .. }));
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let mut store = ProgressStore::load(MemoryStorage::new().failing_writes(), Catalog::builtin());
        let err = store.toggle_done("email").unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert!(store.state().is_done("email"));
    }

    #[test]
    fn test_file_round_trip_across_sessions() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = ProgressStore::load(FileStorage::new(temp.path(), "progress"), Catalog::builtin());
            store.toggle_done("schedule").unwrap();
            store.toggle_bullet("email", 1).unwrap();
        }
        let store = ProgressStore::load(FileStorage::new(temp.path(), "progress"), Catalog::builtin());
        assert!(store.state().is_done("schedule"));
        assert!(store.state().is_checked("email", 1));
        assert_eq!(store.metrics().percent, 20);
    }
}
