//! FreshQuest - freshman onboarding quest
//!
//! Tracks a freshman's progress through a fixed list of onboarding steps, keeps
//! that progress in a small JSON record, and derives a deterministic list of
//! "fortunes" from the student's name and the steps still left. Once every step
//! is done, the reveal wheel unlocks and picks one fortune.
//!
//! # Architecture
//!
//! ```text
//! Catalog (steps) ──┐
//!                   ├── ProgressStore ── ProgressPort (file / memory)
//! ProgressState ────┘        │
//!                            ├── ProgressMetrics (percent, all_complete)
//!                            └── predict::derive_predictions ── rng (FNV-1a + xorshift32)
//!                                        │
//!                                   RevealGate / RevealWheel
//! ```
//!
//! # Example
//!
//! ```ignore
//! use freshquest::{Catalog, MemoryStorage, QuestSession};
//!
//! let mut session = QuestSession::open(MemoryStorage::new(), Catalog::builtin(), Default::default());
//! session.on_name_change("Alice");
//! session.on_toggle_done("email")?;
//! println!("{}% done", session.percent());
//! ```

pub mod cli;
pub mod config;
pub mod predict;
pub mod progress;
pub mod reveal;
pub mod rng;
pub mod session;
pub mod steps;
pub mod storage;
mod store;

pub use predict::{Locale, PredictionRequest, derive_predictions, generate_predictions, seed_string};
pub use progress::{ProgressMetrics, ProgressState};
pub use reveal::{RevealGate, RevealWheel, Spin};
pub use session::{QuestSession, SessionOptions, StepStatus};
pub use steps::{Catalog, CatalogError, Step, StepLink};
pub use storage::{FileStorage, MemoryStorage, ProgressPort, StorageError};
pub use store::{ProgressStore, StoreError};

/// Name used in fortunes when the student has not entered one
pub const DEFAULT_NAME: &str = "You";

/// Default number of fortunes on the wheel
pub const DEFAULT_PREDICTION_COUNT: usize = 10;

/// Name of the persisted progress record
pub const DEFAULT_STORAGE_KEY: &str = "freshman-quest-progress-v1";
