//! Structured article extraction using the Readability algorithm (`dom_smoothie`).
//!
//! The body is rebuilt from the `<p>` elements of the cleaned article HTML so
//! paragraph breaks survive as blank lines, the same shape the paragraph
//! heuristic produces.

use crate::models::Article;
use crate::scrapers::ExtractError;
use crate::scrapers::paragraphs::{PARAGRAPH_SELECTOR, join_paragraphs};
use dom_smoothie::{Config, Readability};
use itertools::Itertools;
use scraper::Html;
use tracing::debug;

/// Bodies shorter than this (in characters) are not trusted as an article.
pub const MIN_ARTICLE_CHARS: usize = 500;

/// Extract the main article from `html`.
///
/// `document_url` is used to resolve relative links. An empty body or one
/// shorter than [`MIN_ARTICLE_CHARS`] counts as a failure so the next
/// strategy gets a chance.
pub fn parse_article(html: &str, document_url: Option<&str>) -> Result<Article, ExtractError> {
    let cfg = Config {
        max_elements_to_parse: 9000,
        ..Default::default()
    };

    let mut readability = Readability::new(html, document_url, Some(cfg))
        .map_err(|e| ExtractError::Readability(e.to_string()))?;
    let parsed = readability
        .parse()
        .map_err(|e| ExtractError::Readability(e.to_string()))?;

    let title = parsed.title.trim().to_string();
    let text = body_text(&parsed.content, &parsed.text_content);
    let chars = text.chars().count();
    debug!(title_len = title.len(), chars, "Readability parse finished");

    if text.is_empty() {
        return Err(ExtractError::EmptyContent);
    }
    if chars < MIN_ARTICLE_CHARS {
        return Err(ExtractError::TooShort { chars });
    }
    Ok(Article { title, text })
}

/// Paragraph-level text of the cleaned article.
///
/// Falls back to the non-empty lines of the plain text when the article HTML
/// has no `<p>` elements.
fn body_text(content: &str, text_content: &str) -> String {
    let fragment = Html::parse_fragment(content);
    let text = join_paragraphs(fragment.select(&PARAGRAPH_SELECTOR));
    if !text.is_empty() {
        return text;
    }
    text_content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .join("\n\n")
}
