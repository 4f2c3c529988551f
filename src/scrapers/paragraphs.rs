//! Heuristic article parsing over raw HTML.
//!
//! The title comes from the first `<title>` element. Body paragraphs are
//! chosen by the first source in [`ParagraphSource::CASCADE`] that yields at
//! least one `<p>`:
//!
//! 1. paragraphs inside the first `<article>`
//! 2. paragraphs inside any element whose class list contains `article-body`
//! 3. paragraphs inside any element whose class list contains `content`
//! 4. every paragraph in the document

use crate::models::Article;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid title selector"));
static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("valid article selector"));
pub(crate) static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid paragraph selector"));

/// Where the body paragraphs of an article were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphSource {
    Article,
    ArticleBody,
    Content,
    Document,
}

impl ParagraphSource {
    pub const CASCADE: [ParagraphSource; 4] = [
        ParagraphSource::Article,
        ParagraphSource::ArticleBody,
        ParagraphSource::Content,
        ParagraphSource::Document,
    ];

    fn select<'a>(self, document: &'a Html) -> Vec<ElementRef<'a>> {
        match self {
            ParagraphSource::Article => document
                .select(&ARTICLE_SELECTOR)
                .next()
                .map(|article| article.select(&PARAGRAPH_SELECTOR).collect())
                .unwrap_or_default(),
            ParagraphSource::ArticleBody => paragraphs_under_class(document, "article-body"),
            ParagraphSource::Content => paragraphs_under_class(document, "content"),
            ParagraphSource::Document => document.select(&PARAGRAPH_SELECTOR).collect(),
        }
    }
}

/// Parse `html` into an [`Article`] and report which cascade step supplied the body.
///
/// Never fails: a page without paragraphs yields an empty body.
pub fn parse_article(html: &str) -> (Article, ParagraphSource) {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let (paragraphs, source) = ParagraphSource::CASCADE
        .iter()
        .map(|&source| (source.select(&document), source))
        .find(|(paragraphs, _)| !paragraphs.is_empty())
        .unwrap_or((Vec::new(), ParagraphSource::Document));

    let count = paragraphs.len();
    let text = join_paragraphs(paragraphs);

    debug!(?source, paragraphs = count, title_len = title.len(), "Parsed article HTML");
    (Article { title, text }, source)
}

/// Trimmed paragraph texts, empties dropped, separated by a blank line.
pub(crate) fn join_paragraphs<'a>(paragraphs: impl IntoIterator<Item = ElementRef<'a>>) -> String {
    paragraphs
        .into_iter()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|p| !p.is_empty())
        .join("\n\n")
}

/// Paragraphs, in document order, that sit inside an element whose class
/// list contains `needle` (case-insensitive substring).
fn paragraphs_under_class<'a>(document: &'a Html, needle: &str) -> Vec<ElementRef<'a>> {
    document
        .select(&PARAGRAPH_SELECTOR)
        .filter(|p| {
            p.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|el| class_contains(el, needle))
        })
        .collect()
}

fn class_contains(element: ElementRef<'_>, needle: &str) -> bool {
    let classes = element.value().classes().join(" ").to_lowercase();
    !classes.is_empty() && classes.contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_paragraphs() {
        let html = r#"<html><head><title> Nota </title></head><body>
            <article><p>Hola</p><p>Mundo</p></article>
        </body></html>"#;
        let (article, source) = parse_article(html);
        assert_eq!(source, ParagraphSource::Article);
        assert_eq!(article.title, "Nota");
        assert_eq!(article.text, "Hola\n\nMundo");
    }

    #[test]
    fn test_only_first_article_is_used() {
        let html = r#"<body>
            <article><p>Primero</p></article>
            <article><p>Segundo</p></article>
        </body>"#;
        let (article, _) = parse_article(html);
        assert_eq!(article.text, "Primero");
    }

    #[test]
    fn test_article_without_paragraphs_falls_through() {
        let html = r#"<body>
            <article><div>Sin párrafos</div></article>
            <div class="Main ARTICLE-BODY-wrapper"><p>Cuerpo</p></div>
            <p>Pie</p>
        </body>"#;
        let (article, source) = parse_article(html);
        assert_eq!(source, ParagraphSource::ArticleBody);
        assert_eq!(article.text, "Cuerpo");
    }

    #[test]
    fn test_multiple_article_body_elements() {
        let html = r#"<body>
            <section class="article-body"><p>Uno</p></section>
            <p>Fuera</p>
            <section class="article-body extra"><p>Dos</p></section>
        </body>"#;
        let (article, _) = parse_article(html);
        assert_eq!(article.text, "Uno\n\nDos");
    }

    #[test]
    fn test_content_class_substring() {
        let html = r#"<body>
            <nav><p>Menú</p></nav>
            <div class="post mainContent"><p> Texto principal </p><p>   </p><p>Más</p></div>
        </body>"#;
        let (article, source) = parse_article(html);
        assert_eq!(source, ParagraphSource::Content);
        assert_eq!(article.text, "Texto principal\n\nMás");
    }

    #[test]
    fn test_nested_matches_are_not_duplicated() {
        let html = r#"<div class="content"><div class="inner-content"><p>Una vez</p></div></div>"#;
        let (article, _) = parse_article(html);
        assert_eq!(article.text, "Una vez");
    }

    #[test]
    fn test_falls_back_to_all_paragraphs() {
        let html = r#"<html><body><p>Uno</p><p>Dos</p><p>Tres</p></body></html>"#;
        let (article, source) = parse_article(html);
        assert_eq!(source, ParagraphSource::Document);
        assert_eq!(article.title, "");
        assert_eq!(article.text, "Uno\n\nDos\n\nTres");
    }

    #[test]
    fn test_page_without_paragraphs() {
        let (article, source) = parse_article("<html><head><title>Vacía</title></head></html>");
        assert_eq!(source, ParagraphSource::Document);
        assert_eq!(article.title, "Vacía");
        assert_eq!(article.text, "");
    }

    #[test]
    fn test_paragraph_text_includes_inline_markup() {
        let html = r#"<article><p>Muy <b>feliz</b> hoy</p></article>"#;
        let (article, _) = parse_article(html);
        assert_eq!(article.text, "Muy feliz hoy");
    }
}
