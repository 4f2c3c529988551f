//! Lexicon-counting emotion scorer.
//!
//! A small, read-only Spanish word list maps tokens to emotion labels. Scoring
//! counts matches per label across all six lexicon labels, then normalizes the
//! four canonical labels by the grand total. `surprise` and `disgust` matches
//! enlarge the denominator but are never emitted.

use crate::models::{Emotion, EmotionScores};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<&'static str, Emotion>> = Lazy::new(|| {
    HashMap::from([
        ("feliz", Emotion::Joy),
        ("contento", Emotion::Joy),
        ("alegre", Emotion::Joy),
        ("entusiasmado", Emotion::Joy),
        ("amor", Emotion::Joy),
        ("enojado", Emotion::Anger),
        ("ira", Emotion::Anger),
        ("molesto", Emotion::Anger),
        ("furioso", Emotion::Anger),
        ("triste", Emotion::Sadness),
        ("lamenta", Emotion::Sadness),
        ("llora", Emotion::Sadness),
        ("miedo", Emotion::Fear),
        ("asustado", Emotion::Fear),
        ("teme", Emotion::Fear),
        ("susto", Emotion::Fear),
        ("sorprendido", Emotion::Surprise),
        ("sorpresa", Emotion::Surprise),
        ("asco", Emotion::Disgust),
        ("disgustado", Emotion::Disgust),
    ])
});

static NON_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\wáéíóúüñÁÉÍÓÚÜÑ]+").expect("valid token separator regex")
});

/// Look up the emotion associated with a lowercase token.
pub fn lookup(token: &str) -> Option<Emotion> {
    LEXICON.get(token).copied()
}

/// Lowercase `text`, collapse separator runs to a single space and split into tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    NON_WORD
        .replace_all(&text.to_lowercase(), " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Score `text` by counting lexicon matches.
///
/// Always returns the four canonical labels; all zeros when nothing matches.
pub fn score(text: &str) -> EmotionScores {
    let mut counts: HashMap<Emotion, usize> = HashMap::new();
    for token in tokenize(text) {
        if let Some(emotion) = lookup(&token) {
            *counts.entry(emotion).or_default() += 1;
        }
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return EmotionScores::zeros();
    }

    EmotionScores::from_fn(|emotion| {
        counts.get(&emotion).copied().unwrap_or(0) as f64 / total as f64
    })
}
