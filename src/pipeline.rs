//! URL -> article -> emotion scores.
//!
//! [`Pipeline`] composes the extractor and the classifier. It is shared by
//! the single-URL command, the batch runner and the HTTP API. Classification
//! (including the lazy model load) runs on tokio's blocking pool so it never
//! stalls the async workers.

use crate::analyzer::EmotionClassifier;
use crate::models::AnalysisResult;
use crate::scrapers::ContentExtractor;
use crate::utils::truncate_for_log;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct Pipeline {
    pub extractor: ContentExtractor,
    pub classifier: Arc<EmotionClassifier>,
}

impl Pipeline {
    pub fn new(extractor: ContentExtractor, classifier: EmotionClassifier) -> Self {
        Self {
            extractor,
            classifier: Arc::new(classifier),
        }
    }

    /// Load the model on the blocking pool. Returns whether the model tier is active.
    pub async fn preload(&self) -> bool {
        let classifier = Arc::clone(&self.classifier);
        match tokio::task::spawn_blocking(move || classifier.preload()).await {
            Ok(ready) => ready,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }

    /// Fetch `url` and score its title and body together.
    ///
    /// Returns `None` when the article could not be extracted.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn analyze_url(&self, url: &str) -> Option<AnalysisResult> {
        let article = self.extractor.fetch(url).await?;
        let text = article.analysis_text();
        debug!(preview = %truncate_for_log(&text, 200), "Scoring article");

        let classifier = Arc::clone(&self.classifier);
        let scores = match tokio::task::spawn_blocking(move || classifier.analyze(&text)).await {
            Ok(scores) => scores,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        };
        let dominant = scores.dominant();
        info!(dominant = ?dominant, state = ?self.classifier.state(), "Scored article");

        Some(AnalysisResult {
            url: url.to_string(),
            title: article.title,
            text: article.text,
            dominant,
            scores,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analyzer::ClassifierState;
    use crate::models::Emotion;
    use crate::scrapers::tests::{spawn_server, test_router};
    use crate::scrapers::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ExtractionStrategy};
    use std::path::PathBuf;

    pub(crate) fn lexicon_pipeline() -> Pipeline {
        let extractor = ContentExtractor::new(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
            .unwrap()
            .with_strategies(vec![ExtractionStrategy::Paragraphs]);
        Pipeline::new(extractor, EmotionClassifier::lexicon_only())
    }

    fn default_chain_pipeline() -> Pipeline {
        let extractor = ContentExtractor::new(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT).unwrap();
        Pipeline::new(extractor, EmotionClassifier::lexicon_only())
    }

    #[tokio::test]
    async fn test_analyze_url_scores_title_and_text() {
        let base = spawn_server(test_router()).await;
        let url = format!("{base}/plana");
        let result = lexicon_pipeline().analyze_url(&url).await.unwrap();
        assert_eq!(result.url, url);
        assert_eq!(result.title, "");
        assert_eq!(result.dominant, Some(Emotion::Joy));
        assert_eq!(result.scores.len(), 4);
    }

    #[tokio::test]
    async fn test_default_chain_keeps_words_apart() {
        let base = spawn_server(test_router()).await;
        let result = default_chain_pipeline()
            .analyze_url(&format!("{base}/plana"))
            .await
            .unwrap();
        assert_eq!(result.text, "Estoy feliz\n\ny alegre\n\npero asustado");
        assert_eq!(result.dominant, Some(Emotion::Joy));
        let joy = result.scores.get(Emotion::Joy).unwrap();
        assert!((joy - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_default_chain_article_page() {
        let base = spawn_server(test_router()).await;
        let result = default_chain_pipeline()
            .analyze_url(&format!("{base}/nota"))
            .await
            .unwrap();
        assert_eq!(result.text, "Hola\n\nMundo");
        assert_eq!(result.dominant, None);
    }

    #[tokio::test]
    async fn test_analyze_url_without_emotion_words() {
        let base = spawn_server(test_router()).await;
        let result = lexicon_pipeline()
            .analyze_url(&format!("{base}/nota"))
            .await
            .unwrap();
        assert_eq!(result.text, "Hola\n\nMundo");
        assert_eq!(result.dominant, None);
    }

    #[tokio::test]
    async fn test_analyze_url_failure() {
        let base = spawn_server(test_router()).await;
        assert!(lexicon_pipeline()
            .analyze_url(&format!("{base}/missing"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_model_load_runs_off_the_async_workers() {
        let extractor = ContentExtractor::new(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT).unwrap();
        let classifier =
            EmotionClassifier::from_model_path(Some(PathBuf::from("/nonexistent/model.json")));
        let pipeline = Pipeline::new(extractor, classifier);
        assert_eq!(pipeline.classifier.state(), ClassifierState::Uninitialized);
        assert!(!pipeline.preload().await);
        assert_eq!(pipeline.classifier.state(), ClassifierState::ModelUnavailable);
    }
}
