//! Two-tier Spanish emotion classifier.
//!
//! [`EmotionClassifier`] scores text with a probabilistic model when one can
//! be loaded and with the [`lexicon`] otherwise. The output shape is the same
//! either way: empty for empty input, the four canonical labels otherwise.
//!
//! # Model lifecycle
//!
//! ```text
//! Uninitialized --first preload()/analyze()--> ModelReady
//!               \-----------------------------> ModelUnavailable (sticky)
//! ```
//!
//! The transition out of `Uninitialized` runs behind a [`OnceLock`], so the
//! loader is invoked at most once per instance even under concurrent first
//! use, and every caller observes the same outcome. A failed load is never
//! retried. A failed prediction only downgrades the call that raised it.

pub mod lexicon;
pub mod model;

use crate::models::{Emotion, EmotionScores};
use model::{EmotionModel, ModelLoader, Prediction};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Lifecycle of the probabilistic tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    Uninitialized,
    ModelReady,
    ModelUnavailable,
}

impl ClassifierState {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassifierState::Uninitialized => "uninitialized",
            ClassifierState::ModelReady => "ready",
            ClassifierState::ModelUnavailable => "unavailable",
        }
    }
}

/// Which tier produced a set of scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringStrategy {
    /// The probabilistic model.
    Model,
    /// The lexicon, because no model is available.
    Lexicon,
    /// The lexicon, because the model raised on this call.
    LexiconFallback,
}

/// Scores plus the strategy that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub scores: EmotionScores,
    pub strategy: ScoringStrategy,
}

/// Emotion classifier with a lazily loaded model and a lexicon fallback.
pub struct EmotionClassifier {
    loader: Option<ModelLoader>,
    model: OnceLock<Option<Box<dyn EmotionModel>>>,
}

impl fmt::Debug for EmotionClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmotionClassifier")
            .field("state", &self.state())
            .finish()
    }
}

impl EmotionClassifier {
    /// Create a classifier that will try `loader` on first use.
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            loader: Some(loader),
            model: OnceLock::new(),
        }
    }

    /// Create a classifier that never attempts to load a model.
    pub fn lexicon_only() -> Self {
        Self {
            loader: None,
            model: OnceLock::from(None),
        }
    }

    /// Classifier backed by a naive Bayes model file, or lexicon-only when no path is given.
    pub fn from_model_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::new(model::naive_bayes_loader(path)),
            None => Self::lexicon_only(),
        }
    }

    pub fn state(&self) -> ClassifierState {
        match self.model.get() {
            None => ClassifierState::Uninitialized,
            Some(Some(_)) => ClassifierState::ModelReady,
            Some(None) => ClassifierState::ModelUnavailable,
        }
    }

    /// Force the lazy model load. Returns whether the model tier is active.
    pub fn preload(&self) -> bool {
        self.model().is_some()
    }

    /// Score `text`. Empty (after trimming) input gives empty scores.
    pub fn analyze(&self, text: &str) -> EmotionScores {
        self.classify(text)
            .map(|c| c.scores)
            .unwrap_or_else(EmotionScores::empty)
    }

    /// The dominant canonical emotion of `text`, if any score is positive.
    pub fn dominant_emotion(&self, text: &str) -> Option<Emotion> {
        self.analyze(text).dominant()
    }

    /// Score `text` and report which tier served the call.
    ///
    /// Returns `None` for empty input.
    pub fn classify(&self, text: &str) -> Option<Classification> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(model) = self.model() else {
            return Some(Classification {
                scores: lexicon::score(text),
                strategy: ScoringStrategy::Lexicon,
            });
        };

        match model.predict(text) {
            Ok(prediction) => Some(Classification {
                scores: project(&prediction),
                strategy: ScoringStrategy::Model,
            }),
            Err(e) => {
                warn!(error = %e, "Model prediction failed; scoring this text with the lexicon");
                Some(Classification {
                    scores: lexicon::score(text),
                    strategy: ScoringStrategy::LexiconFallback,
                })
            }
        }
    }

    fn model(&self) -> Option<&dyn EmotionModel> {
        self.model.get_or_init(|| self.load()).as_deref()
    }

    fn load(&self) -> Option<Box<dyn EmotionModel>> {
        let loader = self.loader.as_ref()?;
        match loader() {
            Ok(model) => {
                info!("Emotion model loaded");
                Some(model)
            }
            Err(e) => {
                warn!(error = %e, "Emotion model unavailable; using lexicon for this classifier");
                None
            }
        }
    }
}

/// Project a model distribution onto the canonical labels, `0.0` where absent.
///
/// Out-of-range values are clamped by [`EmotionScores::from_fn`].
fn project(prediction: &Prediction) -> EmotionScores {
    let distribution = prediction.distribution();
    debug!(labels = distribution.len(), "Projecting model distribution");
    EmotionScores::from_fn(|emotion| distribution.get(emotion.as_str()).copied().unwrap_or(0.0))
}
