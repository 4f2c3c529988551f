//! Probabilistic emotion model backends.
//!
//! The classifier talks to models through the [`EmotionModel`] trait and
//! obtains them through a [`ModelLoader`], so that loading can be deferred
//! until the first analysis and attempted at most once.
//!
//! The bundled backend is a multinomial naive Bayes model read from a JSON
//! file:
//!
//! ```json
//! {
//!   "labels": ["anger", "fear", "joy", "sadness", "others"],
//!   "priors": { "joy": -1.2, "anger": -1.9 },
//!   "likelihoods": { "joy": { "feliz": -2.3 } },
//!   "unknown_log_prob": -12.0
//! }
//! ```
//!
//! Priors and likelihoods are natural-log probabilities.

use crate::analyzer::lexicon;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Errors raised while loading or invoking a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model file could not be read.
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The model file is not valid JSON for the expected schema.
    #[error("malformed model file: {0}")]
    Format(#[from] serde_json::Error),

    /// The model file parsed but is unusable.
    #[error("invalid model: {0}")]
    Invalid(String),

    /// A single prediction failed.
    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// Raw output of a model prediction.
///
/// Backends disagree on where the distribution lives: some fill `probas`,
/// others `scores`. When neither is present the predicted `output` label is
/// taken with probability 1.0.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Prediction {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub probas: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub scores: Option<HashMap<String, f64>>,
}

impl Prediction {
    /// The label -> probability mapping carried by this prediction.
    pub fn distribution(&self) -> HashMap<String, f64> {
        if let Some(probas) = self.probas.as_ref().filter(|p| !p.is_empty()) {
            return probas.clone();
        }
        if let Some(scores) = self.scores.as_ref().filter(|s| !s.is_empty()) {
            return scores.clone();
        }
        let label = self.output.clone().unwrap_or_else(|| "others".to_string());
        HashMap::from([(label, 1.0)])
    }
}

/// A probabilistic emotion model.
pub trait EmotionModel: Send + Sync {
    /// Predict the emotion distribution of `text`.
    fn predict(&self, text: &str) -> Result<Prediction, ModelError>;
}

/// Deferred model construction. Invoked at most once per classifier.
pub type ModelLoader = Box<dyn Fn() -> Result<Box<dyn EmotionModel>, ModelError> + Send + Sync>;

/// Loader that reads a [`NaiveBayesModel`] from `path`.
pub fn naive_bayes_loader(path: PathBuf) -> ModelLoader {
    Box::new(move || -> Result<Box<dyn EmotionModel>, ModelError> {
        let model = NaiveBayesModel::from_path(&path)?;
        Ok(Box::new(model) as Box<dyn EmotionModel>)
    })
}

/// Multinomial naive Bayes classifier over lexicon tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NaiveBayesModel {
    labels: Vec<String>,
    priors: HashMap<String, f64>,
    #[serde(default)]
    likelihoods: HashMap<String, HashMap<String, f64>>,
    #[serde(default = "default_unknown_log_prob")]
    unknown_log_prob: f64,
}

fn default_unknown_log_prob() -> f64 {
    -12.0
}

impl NaiveBayesModel {
    /// Read and validate a model file.
    #[instrument(level = "info", skip(path), fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&raw)?;
        info!(labels = model.labels.len(), "Loaded naive Bayes emotion model");
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let model: NaiveBayesModel = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.labels.is_empty() {
            return Err(ModelError::Invalid("model declares no labels".to_string()));
        }
        if let Some(missing) = self.labels.iter().find(|l| !self.priors.contains_key(*l)) {
            return Err(ModelError::Invalid(format!("no prior for label {missing}")));
        }
        Ok(())
    }

    fn in_vocabulary(&self, token: &str) -> bool {
        self.likelihoods.values().any(|table| table.contains_key(token))
    }
}

impl EmotionModel for NaiveBayesModel {
    fn predict(&self, text: &str) -> Result<Prediction, ModelError> {
        let tokens = lexicon::tokenize(text);
        if tokens.is_empty() {
            return Err(ModelError::Prediction("no tokens in input".to_string()));
        }
        let known: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| self.in_vocabulary(t))
            .collect();
        debug!(tokens = tokens.len(), known = known.len(), "Scoring with naive Bayes");

        let log_posteriors: Vec<f64> = self
            .labels
            .iter()
            .map(|label| {
                let prior = self.priors.get(label).copied().unwrap_or(self.unknown_log_prob);
                let table = self.likelihoods.get(label);
                let evidence: f64 = known
                    .iter()
                    .map(|t| {
                        table
                            .and_then(|tbl| tbl.get(*t))
                            .copied()
                            .unwrap_or(self.unknown_log_prob)
                    })
                    .sum();
                prior + evidence
            })
            .collect();

        let max = log_posteriors.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(ModelError::Prediction("degenerate posterior".to_string()));
        }
        let exps: Vec<f64> = log_posteriors.iter().map(|lp| (lp - max).exp()).collect();
        let norm: f64 = exps.iter().sum();

        let probas: HashMap<String, f64> = self
            .labels
            .iter()
            .cloned()
            .zip(exps.iter().map(|e| e / norm))
            .collect();
        let output = self
            .labels
            .iter()
            .zip(&log_posteriors)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(label, _)| label.clone());

        Ok(Prediction {
            output,
            probas: Some(probas),
            scores: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MODEL_JSON: &str = r#"{
        "labels": ["anger", "fear", "joy", "sadness", "others"],
        "priors": {"anger": -1.6, "fear": -1.6, "joy": -1.6, "sadness": -1.6, "others": -1.6},
        "likelihoods": {
            "joy": {"feliz": -1.0, "fiesta": -1.5},
            "sadness": {"triste": -1.0, "fiesta": -6.0},
            "fear": {"miedo": -1.0}
        },
        "unknown_log_prob": -8.0
    }"#;

    #[test]
    fn test_prediction_prefers_probas() {
        let prediction = Prediction {
            output: Some("joy".to_string()),
            probas: Some(HashMap::from([("fear".to_string(), 0.9)])),
            scores: Some(HashMap::from([("joy".to_string(), 0.9)])),
        };
        assert_eq!(prediction.distribution().get("fear"), Some(&0.9));
    }

    #[test]
    fn test_prediction_falls_back_to_scores() {
        let prediction: Prediction =
            serde_json::from_str(r#"{"scores": {"anger": 0.7, "joy": 0.3}}"#).unwrap();
        let dist = prediction.distribution();
        assert_eq!(dist.get("anger"), Some(&0.7));
        assert_eq!(dist.len(), 2);
    }

    #[test]
    fn test_prediction_falls_back_to_output_label() {
        let prediction = Prediction {
            output: Some("sadness".to_string()),
            ..Default::default()
        };
        assert_eq!(prediction.distribution(), HashMap::from([("sadness".to_string(), 1.0)]));
        assert_eq!(
            Prediction::default().distribution(),
            HashMap::from([("others".to_string(), 1.0)])
        );
    }

    #[test]
    fn test_naive_bayes_predicts_joy() {
        let model = NaiveBayesModel::from_json(MODEL_JSON).unwrap();
        let prediction = model.predict("¡Qué feliz fiesta!").unwrap();
        let probas = prediction.probas.clone().unwrap();
        assert_eq!(prediction.output.as_deref(), Some("joy"));
        let total: f64 = probas.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(probas["joy"] > probas["sadness"]);
    }

    #[test]
    fn test_naive_bayes_rejects_empty_input() {
        let model = NaiveBayesModel::from_json(MODEL_JSON).unwrap();
        assert!(matches!(model.predict("  ...  "), Err(ModelError::Prediction(_))));
    }

    #[test]
    fn test_naive_bayes_unknown_words_give_priors() {
        let model = NaiveBayesModel::from_json(MODEL_JSON).unwrap();
        let probas = model.predict("congreso presupuesto").unwrap().probas.unwrap();
        assert!((probas["anger"] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_models_are_rejected() {
        assert!(matches!(
            NaiveBayesModel::from_json(r#"{"labels": [], "priors": {}}"#),
            Err(ModelError::Invalid(_))
        ));
        assert!(matches!(
            NaiveBayesModel::from_json(r#"{"labels": ["joy"], "priors": {}}"#),
            Err(ModelError::Invalid(_))
        ));
        assert!(matches!(
            NaiveBayesModel::from_json("not json"),
            Err(ModelError::Format(_))
        ));
    }

    #[test]
    fn test_loader_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL_JSON.as_bytes()).unwrap();
        let loader = naive_bayes_loader(file.path().to_path_buf());
        let model = loader().unwrap();
        assert!(model.predict("miedo").is_ok());
    }

    #[test]
    fn test_loader_missing_file() {
        let loader = naive_bayes_loader(PathBuf::from("/nonexistent/emotion-model.json"));
        assert!(matches!(loader(), Err(ModelError::Io { .. })));
    }
}
