//! Data models for fetched articles, emotion labels and analysis results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: Title and body text extracted from a news page
//! - [`Emotion`]: The emotion labels known to the classifier
//! - [`EmotionScores`]: The fixed-shape score mapping returned by analysis
//! - [`AnalysisResult`] / [`BatchEntry`]: Records emitted by the HTTP and batch surfaces

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A news article as extracted from a web page.
///
/// Produced once per successful fetch. Extraction failures are reported as
/// `None` by the extractor, never as a partially filled `Article`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// The page title (may be empty).
    pub title: String,
    /// The main body text, paragraphs separated by a blank line.
    pub text: String,
}

impl Article {
    /// The string handed to the classifier: title and body separated by a blank line.
    pub fn analysis_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.text)
    }
}

/// An emotion label.
///
/// The first four variants are the canonical output labels. `Surprise` and
/// `Disgust` only exist inside the lexicon and never appear in
/// [`EmotionScores`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Fear,
    Joy,
    Sadness,
    Surprise,
    Disgust,
}

impl Emotion {
    /// Output labels, in emission and tie-break priority order.
    pub const CANONICAL: [Emotion; 4] =
        [Emotion::Anger, Emotion::Fear, Emotion::Joy, Emotion::Sadness];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
            Emotion::Disgust => "disgust",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotion scores for a piece of text.
///
/// Either empty (no text to analyze) or holding exactly the four canonical
/// labels, each in `[0, 1]`. [`EmotionScores::from_fn`] clamps every value
/// into that range and deserialization rejects any other shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmotionScores(BTreeMap<Emotion, f64>);

/// Why a label map is not a valid [`EmotionScores`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoresError {
    #[error("unexpected emotion label {0}")]
    UnexpectedLabel(Emotion),

    #[error("missing emotion label {0}")]
    MissingLabel(Emotion),

    #[error("score {value} for {emotion} is outside [0, 1]")]
    OutOfRange { emotion: Emotion, value: f64 },
}

impl TryFrom<BTreeMap<Emotion, f64>> for EmotionScores {
    type Error = ScoresError;

    fn try_from(map: BTreeMap<Emotion, f64>) -> Result<Self, Self::Error> {
        if map.is_empty() {
            return Ok(Self::empty());
        }
        if let Some(&extra) = map.keys().find(|e| !Emotion::CANONICAL.contains(e)) {
            return Err(ScoresError::UnexpectedLabel(extra));
        }
        for emotion in Emotion::CANONICAL {
            match map.get(&emotion) {
                None => return Err(ScoresError::MissingLabel(emotion)),
                Some(&value) if !(0.0..=1.0).contains(&value) => {
                    return Err(ScoresError::OutOfRange { emotion, value });
                }
                Some(_) => {}
            }
        }
        Ok(Self(map))
    }
}

impl<'de> Deserialize<'de> for EmotionScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<Emotion, f64>::deserialize(deserializer)?;
        Self::try_from(map).map_err(serde::de::Error::custom)
    }
}

/// Clamp a score into `[0, 1]`; non-finite values become `0.0`.
fn unit_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl EmotionScores {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// All four canonical labels at `0.0`.
    pub fn zeros() -> Self {
        Self::from_fn(|_| 0.0)
    }

    /// Build the four canonical scores from a per-label function, clamped to `[0, 1]`.
    pub fn from_fn(mut score: impl FnMut(Emotion) -> f64) -> Self {
        Self(
            Emotion::CANONICAL
                .iter()
                .map(|&e| (e, unit_score(score(e))))
                .collect(),
        )
    }

    pub fn get(&self, emotion: Emotion) -> Option<f64> {
        self.0.get(&emotion).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        self.0.iter().map(|(&e, &v)| (e, v))
    }

    /// The label with the highest strictly positive score.
    ///
    /// Ties go to the earliest label in [`Emotion::CANONICAL`]. Returns `None`
    /// for empty scores or when every score is `0.0`.
    pub fn dominant(&self) -> Option<Emotion> {
        let mut best: Option<(Emotion, f64)> = None;
        for emotion in Emotion::CANONICAL {
            let Some(value) = self.get(emotion) else {
                continue;
            };
            match best {
                Some((_, top)) if value <= top => {}
                _ => best = Some((emotion, value)),
            }
        }
        best.filter(|&(_, value)| value > 0.0).map(|(emotion, _)| emotion)
    }
}

/// Result of running the full pipeline on one URL.
///
/// Serialized as the HTTP `/analyze` response body and as a successful batch entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisResult {
    pub url: String,
    pub title: String,
    pub text: String,
    pub dominant: Option<Emotion>,
    pub scores: EmotionScores,
}

/// One element of the batch output array.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Analyzed(AnalysisResult),
    Failed { url: String, error: String },
}

impl BatchEntry {
    pub fn url(&self) -> &str {
        match self {
            BatchEntry::Analyzed(result) => &result.url,
            BatchEntry::Failed { url, .. } => url,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchEntry::Failed { .. })
    }
}
