//! Article extraction from news URLs.
//!
//! [`ContentExtractor`] runs an ordered chain of [`ExtractionStrategy`]s and
//! returns the first article produced:
//!
//! | Strategy | Module | Method |
//! |----------|--------|--------|
//! | Readability | [`readability`] | Readability scoring via `dom_smoothie` |
//! | Paragraphs | [`paragraphs`] | `<title>` plus a `<p>` selection cascade |
//!
//! A failing strategy (network error, non-200 status, unparseable or empty
//! page) is logged and the next one is tried. When the last strategy fails
//! the whole extraction fails; callers that only need the article use
//! [`ContentExtractor::fetch`], which collapses every failure into `None`.
//!
//! Each strategy performs its own GET with the configured timeout and a
//! desktop browser `User-Agent`. Nothing is retried.
//!
//! The [`rss`] submodule indexes article URLs from RSS/Atom feeds for batch runs.

pub mod paragraphs;
pub mod readability;
pub mod rss;

use crate::models::Article;
use paragraphs::ParagraphSource;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// User agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reasons an extraction step can fail.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Building the client, connecting, timing out or reading the body failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK.
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    /// The Readability parser rejected the page.
    #[error("readability extraction failed: {0}")]
    Readability(String),

    /// The page parsed but no article text was found.
    #[error("no article content found")]
    EmptyContent,

    /// Readability found a body too short to be the article.
    #[error("article body too short ({chars} characters)")]
    TooShort { chars: usize },

    /// The extractor was configured without strategies.
    #[error("no extraction strategies configured")]
    NoStrategies,
}

/// One link of the extraction chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    Readability,
    Paragraphs,
}

impl ExtractionStrategy {
    pub const DEFAULT_CHAIN: [ExtractionStrategy; 2] =
        [ExtractionStrategy::Readability, ExtractionStrategy::Paragraphs];
}

/// Which strategy produced an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractedBy {
    Readability,
    Paragraphs(ParagraphSource),
}

/// A successfully extracted article and its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub article: Article,
    pub extracted_by: ExtractedBy,
}

/// Fetches news pages and extracts their title and body text.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    client: Client,
    strategies: Vec<ExtractionStrategy>,
}

impl ContentExtractor {
    /// Build an extractor with the default strategy chain.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            strategies: ExtractionStrategy::DEFAULT_CHAIN.to_vec(),
        })
    }

    /// Replace the strategy chain. Order is priority order.
    pub fn with_strategies(mut self, strategies: Vec<ExtractionStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn strategies(&self) -> &[ExtractionStrategy] {
        &self.strategies
    }

    /// Fetch `url` and return its article, or `None` on any failure.
    pub async fn fetch(&self, url: &str) -> Option<Article> {
        self.extract(url).await.ok().map(|extraction| extraction.article)
    }

    /// Fetch `url`, trying each strategy in turn, and report which one succeeded.
    ///
    /// The error is the one raised by the last strategy attempted.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn extract(&self, url: &str) -> Result<Extraction, ExtractError> {
        let mut last_error = ExtractError::NoStrategies;
        for &strategy in &self.strategies {
            match self.run(strategy, url).await {
                Ok(extraction) => {
                    info!(
                        by = ?extraction.extracted_by,
                        title_len = extraction.article.title.len(),
                        text_len = extraction.article.text.len(),
                        "Extracted article"
                    );
                    return Ok(extraction);
                }
                Err(e) => {
                    warn!(?strategy, error = %e, "Extraction strategy failed; trying next");
                    last_error = e;
                }
            }
        }
        warn!(error = %last_error, "All extraction strategies failed");
        Err(last_error)
    }

    async fn run(
        &self,
        strategy: ExtractionStrategy,
        url: &str,
    ) -> Result<Extraction, ExtractError> {
        let html = self.download(url).await?;
        match strategy {
            ExtractionStrategy::Readability => {
                let article = readability::parse_article(&html, Some(url))?;
                Ok(Extraction {
                    article,
                    extracted_by: ExtractedBy::Readability,
                })
            }
            ExtractionStrategy::Paragraphs => {
                let (article, source) = paragraphs::parse_article(&html);
                Ok(Extraction {
                    article,
                    extracted_by: ExtractedBy::Paragraphs(source),
                })
            }
        }
    }

    async fn download(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExtractError::Status(status));
        }
        let body = response.text().await?;
        debug!(bytes = body.len(), "Downloaded page");
        Ok(body)
    }

    /// The underlying HTTP client, shared with feed indexing.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
