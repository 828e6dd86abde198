//! FreshQuest configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Catalog, FileStorage, Locale, SessionOptions};

/// Main FreshQuest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the progress record and logs
    #[serde(rename = "storage-dir")]
    pub storage_dir: PathBuf,

    /// Name of the progress record
    #[serde(rename = "storage-key")]
    pub storage_key: String,

    /// Display name used in fortunes (empty means "You")
    pub name: String,

    /// Fortune locale
    pub locale: Locale,

    /// Number of fortunes on the wheel
    #[serde(rename = "prediction-count")]
    pub prediction_count: usize,

    /// Optional YAML list of steps replacing the built-in roadmap
    #[serde(rename = "steps-file")]
    pub steps_file: Option<PathBuf>,
}

fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("freshquest")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            storage_key: crate::DEFAULT_STORAGE_KEY.to_string(),
            name: String::new(),
            locale: Locale::default(),
            prediction_count: crate::DEFAULT_PREDICTION_COUNT,
            steps_file: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .freshquest.yml
        let local_config = PathBuf::from(".freshquest.yml");
        if local_config.exists() {
            return Self::load_from_file(&local_config)
                .context(format!("Failed to load config from {}", local_config.display()));
        }

        // Try user config: ~/.config/freshquest/freshquest.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("freshquest").join("freshquest.yml");
            if user_config.exists() {
                return Self::load_from_file(&user_config)
                    .context(format!("Failed to load config from {}", user_config.display()));
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate configuration before use
    ///
    /// The wheel needs at least one fortune to land on.
    pub fn validate(&self) -> Result<()> {
        if self.prediction_count == 0 {
            return Err(eyre::eyre!("prediction-count must be at least 1"));
        }
        Ok(())
    }

    /// The configured step catalog, or the built-in roadmap
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.steps_file {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::builtin()),
        }
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.storage_dir, &self.storage_key)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.storage_dir.join("logs")
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            name: self.name.clone(),
            locale: self.locale,
            prediction_count: self.prediction_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage_key, "freshman-quest-progress-v1");
        assert_eq!(config.prediction_count, 10);
        assert_eq!(config.locale, Locale::En);
        assert!(config.steps_file.is_none());
        assert!(config.storage_dir.ends_with("freshquest"));
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
name: Alice
prediction-count: 6
storage-dir: /tmp/fq-test
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "Alice");
        assert_eq!(config.prediction_count, 6);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/fq-test"));
        assert_eq!(config.storage_key, crate::DEFAULT_STORAGE_KEY);
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/fq-test/logs"));
    }

    #[test]
    fn test_unknown_locale_rejected() {
        assert!(serde_yaml::from_str::<Config>("locale: kk\n").is_err());
    }

    #[test]
    fn test_load_explicit_path_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("freshquest.yml");
        let config = Config {
            name: "Bob".to_string(),
            storage_dir: temp.path().join("data"),
            ..Config::default()
        };
        fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.session_options().name, "Bob");
    }

    #[test]
    fn test_zero_prediction_count_rejected() {
        let config = Config {
            prediction_count: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("freshquest.yml");
        fs::write(&path, "prediction-count: 0\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:?}", err).contains("prediction-count must be at least 1"));
    }

    #[test]
    fn test_malformed_explicit_config_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("freshquest.yml");
        fs::write(&path, "prediction-count: [oops\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_catalog_from_steps_file() {
        let temp = TempDir::new().unwrap();
        let steps = temp.path().join("steps.yml");
        fs::write(&steps, "- {id: one, title: First}\n").unwrap();
        let config = Config {
            steps_file: Some(steps),
            ..Config::default()
        };
        assert_eq!(config.catalog().unwrap().len(), 1);
        assert_eq!(Config::default().catalog().unwrap().len(), 5);
    }
}
