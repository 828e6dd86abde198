//! Local fortune generator
//!
//! Output is a pure function of (name, steps left, locale, count). The stream
//! is reseeded on every call, so progress or a new name changes the fortunes
//! while identical inputs always reproduce them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rng::{XorShift32, pick};
use crate::{Catalog, DEFAULT_NAME, DEFAULT_PREDICTION_COUNT, ProgressState};

/// Supported fortune locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
}

impl Locale {
    /// Tag mixed into the seed string
    pub fn tag(&self) -> &'static str {
        match self {
            Self::En => "en",
        }
    }

    fn templates(&self) -> &'static [&'static str] {
        match self {
            Self::En => EN_TEMPLATES,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Locale {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Self::En),
            other => Err(eyre::eyre!("Unsupported locale: {}", other)),
        }
    }
}

const EN_TEMPLATES: &[&str] = &[
    "{name} finds a perfect study spot near {place}.",
    "{name} cracks the {topic} quiz with calm confidence.",
    "A friendly mentor appears at {place} right on time.",
    "You join {club} and meet your future teammate.",
    "Free coffee finds you after {task}\u{2014}pure luck.",
    "A professor remembers your name during {event}.",
    "Your {topic} notes go viral in the group chat.",
    "You speedrun library resources in one afternoon.",
    "The Wi-Fi behaves during your {task} session.",
    "Your timetable puzzle clicks, zero clashes.",
    "You gonna get 3 retakes bro\u{1F494}",
    "prepare for the worst HAHA (sorry:3)",
    "Your scholarship will fade away after 1st semester, better study harder",
    "Amrskk may be will help you out with your studies, but only if you ask him nicely",
    "You are going to get annoyed with people sitting in the halyk coworking 24/7",
];

const PLACES: &[&str] = &["the library", "Main Hall", "Cafeteria A", "the printing room", "Dorm lobby"];
const TOPICS: &[&str] = &[
    "calculus",
    "physics",
    "linear algebra",
    "programming principles",
    "discrete structures",
];
const CLUBS: &[&str] = &["Robotics", "Debate", "Music", "AI Society", "Sports"];
const TASKS: &[&str] = &["group study", "project sprint", "lab prep", "note review", "morning planning"];
const EVENTS: &[&str] = &["orientation", "first lecture", "TA session", "club fair", "lab intro"];

/// Inputs to [`generate_predictions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    /// Display name; empty means [`DEFAULT_NAME`]
    pub name: String,
    /// Titles of steps not yet done, in catalog order
    pub steps_left: Vec<String>,
    pub locale: Locale,
    pub count: usize,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            steps_left: Vec::new(),
            locale: Locale::default(),
            count: DEFAULT_PREDICTION_COUNT,
        }
    }
}

impl PredictionRequest {
    /// The name that ends up in the seed and the fortunes
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { DEFAULT_NAME } else { &self.name }
    }
}

/// `name|step,step,...|locale`
pub fn seed_string(name: &str, steps_left: &[String], locale: Locale) -> String {
    format!("{}|{}|{}", name, steps_left.join(","), locale.tag())
}

/// Produce exactly `request.count` fortunes
pub fn generate_predictions(request: &PredictionRequest) -> Vec<String> {
    let name = request.display_name();
    let seed = seed_string(name, &request.steps_left, request.locale);
    let mut rng = XorShift32::from_seed_str(&seed);
    let templates = request.locale.templates();
    let first_step = request.steps_left.first().map(|s| s.to_lowercase());

    let mut out: Vec<String> = Vec::with_capacity(request.count);
    for _ in 0..request.count {
        // Every placeholder value is drawn each round so the stream position
        // does not depend on which template came up.
        let template = *pick(templates, &mut rng);
        let place = *pick(PLACES, &mut rng);
        let topic = match &first_step {
            Some(step) => step.clone(),
            None => pick(TOPICS, &mut rng).to_string(),
        };
        let club = *pick(CLUBS, &mut rng);
        let task = *pick(TASKS, &mut rng);
        let event = *pick(EVENTS, &mut rng);

        let filled = template
            .replace("{name}", name)
            .replace("{place}", place)
            .replace("{topic}", &topic)
            .replace("{club}", club)
            .replace("{task}", task)
            .replace("{event}", event);

        if !out.contains(&filled) {
            out.push(filled);
        }
    }

    let distinct = out.len();
    while out.len() < request.count {
        out.push(pick(templates, &mut rng).replace("{name}", name));
    }
    out.truncate(request.count);

    debug!(%seed, distinct, count = request.count, "generate_predictions: done");
    out
}

/// Fortunes for the current progress and name
pub fn derive_predictions(
    state: &ProgressState,
    catalog: &Catalog,
    name: &str,
    locale: Locale,
    count: usize,
) -> Vec<String> {
    generate_predictions(&PredictionRequest {
        name: name.to_string(),
        steps_left: catalog.titles_left(state),
        locale,
        count,
    })
}
