//! Canonical onboarding steps
//!
//! The catalog is static configuration: it is either the built-in freshman
//! roadmap or a YAML list supplied through `steps-file`. Persisted progress is
//! always validated against it.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// A link shown under a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepLink {
    pub label: String,
    pub href: String,
}

/// One onboarding step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Unique key, also used as the key in persisted progress
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// Quick checklist points, addressed by position
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub links: Vec<StepLink>,
}

impl Step {
    fn new(id: &str, title: &str, summary: &str, bullets: &[&str], links: &[(&str, &str)]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
            links: links
                .iter()
                .map(|(label, href)| StepLink {
                    label: label.to_string(),
                    href: href.to_string(),
                })
                .collect(),
        }
    }
}

/// Errors raised while building a catalog
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate step id: {0}")]
    DuplicateId(String),

    #[error("Step has an empty id (title: {0:?})")]
    EmptyId(String),
}

/// Ordered, immutable list of steps with unique ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    steps: Vec<Step>,
}

impl Catalog {
    /// Build a catalog, rejecting empty or duplicate ids
    pub fn new(steps: Vec<Step>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for step in &steps {
            if step.id.is_empty() {
                return Err(CatalogError::EmptyId(step.title.clone()));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(CatalogError::DuplicateId(step.id.clone()));
            }
        }
        debug!(count = steps.len(), "Catalog::new: built catalog");
        Ok(Self { steps })
    }

    /// The built-in freshman roadmap
    pub fn builtin() -> Self {
        Self {
            steps: vec![
                Step::new(
                    "Orientation week",
                    "Orientation Week and Campus Tour",
                    "Join the orientation week events to meet mentors, explore campus, and get your first tasks.",
                    &[
                        "Visited orientation week",
                        "Got the event schedule",
                        "Met your mentor",
                        "Visited the campus",
                    ],
                    &[],
                ),
                Step::new(
                    "email",
                    "Activate Student Email",
                    "Get your @uni mail working. You'll need it for WSP, Wi-Fi, apps, library, and password resets.",
                    &[
                        "Receive login and password from kbtu on your main email and check if Outlook login and password work",
                        "Set up your WSP password",
                        "Install Outlook app on your phone",
                    ],
                    &[],
                ),
                Step::new(
                    "microsoft 365",
                    "Access Microsoft 365 and Teams",
                    "Log into your Outlook email (account), password is going to be the same as your WSP password, then access Microsoft 365 apps.",
                    &["Login works", "Enroll to Microsoft Teams account", "Microsoft 365 apps installed"],
                    &[("outlook", "https://outlook.office.com/mail/")],
                ),
                Step::new(
                    "schedule",
                    "How to find your schedule",
                    "You can find your schedule on WSP website, just click the 'house' icon and enter the 'student schedule' section",
                    &[
                        "Logged in on your WSP account",
                        "Clicked the 'house' icon",
                        "Schedule section opened",
                    ],
                    &[("Timetable Tool", "https://wsp.kbtu.kz/")],
                ),
                Step::new(
                    "clubs",
                    "Clubs & Communities",
                    "Pick a club or a community to try in the first month.",
                    &["Attend the clubs fair", "Find a club for yourself", "Talk to a mentor"],
                    &[],
                ),
            ],
        }
    }

    /// Load a catalog from a YAML list of steps
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).context(format!("Failed to read steps file: {}", path.display()))?;
        let steps: Vec<Step> = serde_yaml::from_str(&content).context("Failed to parse steps file")?;
        let catalog = Self::new(steps)?;
        info!(path = %path.display(), count = catalog.len(), "Loaded step catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Step ids in catalog order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Titles of the steps not yet marked done, in catalog order
    pub fn titles_left(&self, state: &crate::ProgressState) -> Vec<String> {
        self.steps
            .iter()
            .filter(|s| !state.is_done(&s.id))
            .map(|s| s.title.clone())
            .collect()
    }
}

/// True when every bullet of `step` is checked; vacuously true without bullets
pub fn checklist_complete(step: &Step, bullets: Option<&BTreeMap<u32, bool>>) -> bool {
    (0..step.bullets.len()).all(|i| {
        bullets
            .and_then(|b| u32::try_from(i).ok().and_then(|i| b.get(&i)))
            .copied()
            .unwrap_or(false)
    })
}
