//! Application configuration.
//!
//! Settings come from an optional YAML file and are then overridden by CLI
//! flags / environment variables. Every key is optional:
//!
//! ```yaml
//! timeout_secs: 10
//! user_agent: "Mozilla/5.0 ..."
//! model_path: /var/lib/emociones/model.json
//! use_model: true
//! extraction_strategies: [readability, paragraphs]
//! ```
//!
//! `extraction_strategies` must end with `paragraphs` and list each strategy
//! at most once, so the chain is either `[paragraphs]` or
//! `[readability, paragraphs]`.

use crate::analyzer::EmotionClassifier;
use crate::cli::Cli;
use crate::scrapers::{
    ContentExtractor, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ExtractError, ExtractionStrategy,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid extraction_strategies: {0}")]
    Strategies(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Timeout for each article download, in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with page requests.
    pub user_agent: String,
    /// Naive Bayes model file; without one the classifier is lexicon-only.
    pub model_path: Option<PathBuf>,
    /// Set to `false` to never load the model even when a path is configured.
    pub use_model: bool,
    /// Extraction strategies, in priority order. The paragraph heuristic must come last.
    pub extraction_strategies: Vec<ExtractionStrategy>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            model_path: None,
            use_model: true,
            extraction_strategies: ExtractionStrategy::DEFAULT_CHAIN.to_vec(),
        }
    }
}

/// Read a YAML config file.
#[instrument(level = "info", skip(path), fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = AppConfig::from_yaml(&raw)?;
    info!(?config, "Loaded configuration");
    Ok(config)
}

impl AppConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the extraction chain ends with the paragraph heuristic.
    ///
    /// The paragraph step is the one whose non-200 answer means "no article",
    /// so nothing may run after it, and it must be present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chain = &self.extraction_strategies;
        if chain.last() != Some(&ExtractionStrategy::Paragraphs) {
            return Err(ConfigError::Strategies(format!(
                "{chain:?} must end with paragraphs"
            )));
        }
        if chain.iter().duplicates().next().is_some() {
            return Err(ConfigError::Strategies(format!(
                "{chain:?} lists a strategy twice"
            )));
        }
        Ok(())
    }

    /// Load the file named by `--config` (defaults otherwise) and apply CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => load_config(path)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(cli))
    }

    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(secs) = cli.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(path) = &cli.model_path {
            self.model_path = Some(path.clone());
        }
        if cli.lexicon_only {
            self.use_model = false;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn build_extractor(&self) -> Result<ContentExtractor, ExtractError> {
        Ok(ContentExtractor::new(self.timeout(), &self.user_agent)?
            .with_strategies(self.extraction_strategies.clone()))
    }

    pub fn build_classifier(&self) -> EmotionClassifier {
        if self.use_model {
            EmotionClassifier::from_model_path(self.model_path.clone())
        } else {
            EmotionClassifier::lexicon_only()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ClassifierState;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.use_model);
        assert_eq!(
            config.extraction_strategies,
            vec![ExtractionStrategy::Readability, ExtractionStrategy::Paragraphs]
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config =
            AppConfig::from_yaml("timeout_secs: 3\nextraction_strategies: [paragraphs]\n")
                .unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.extraction_strategies, vec![ExtractionStrategy::Paragraphs]);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml("  \n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            AppConfig::from_yaml("extraction_strategies: [newspaper]"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_default_chain_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
        assert!(AppConfig::from_yaml("extraction_strategies: [readability, paragraphs]").is_ok());
    }

    #[test]
    fn test_chain_must_end_with_paragraphs() {
        for yaml in [
            "extraction_strategies: [paragraphs, readability]",
            "extraction_strategies: [readability]",
            "extraction_strategies: []",
        ] {
            assert!(
                matches!(AppConfig::from_yaml(yaml), Err(ConfigError::Strategies(_))),
                "accepted {yaml}"
            );
        }
    }

    #[test]
    fn test_chain_rejects_duplicates() {
        assert!(matches!(
            AppConfig::from_yaml("extraction_strategies: [paragraphs, paragraphs]"),
            Err(ConfigError::Strategies(_))
        ));
    }

    #[test]
    fn test_load_config_rejects_reordered_chain() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "extraction_strategies: [paragraphs, readability]").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Strategies(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model_path: /tmp/modelo.json").unwrap();
        writeln!(file, "use_model: false").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.model_path, Some(PathBuf::from("/tmp/modelo.json")));
        assert!(!config.use_model);
    }

    #[test]
    fn test_missing_config_file() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/config.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "emociones_farandula",
            "--timeout-secs",
            "2",
            "--model-path",
            "modelo.json",
            "--lexicon-only",
            "analyze",
            "https://example.com",
        ]);
        let config = AppConfig::default().with_overrides(&cli);
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.model_path, Some(PathBuf::from("modelo.json")));
        assert!(!config.use_model);
        assert_eq!(config.build_classifier().state(), ClassifierState::ModelUnavailable);
    }

    #[test]
    fn test_classifier_with_model_path_starts_uninitialized() {
        let config = AppConfig {
            model_path: Some(PathBuf::from("/nonexistent/model.json")),
            ..AppConfig::default()
        };
        assert_eq!(config.build_classifier().state(), ClassifierState::Uninitialized);
    }

    #[test]
    fn test_build_extractor_uses_configured_chain() {
        let config = AppConfig {
            extraction_strategies: vec![ExtractionStrategy::Paragraphs],
            ..AppConfig::default()
        };
        let extractor = config.build_extractor().unwrap();
        assert_eq!(extractor.strategies(), &[ExtractionStrategy::Paragraphs]);
    }
}
