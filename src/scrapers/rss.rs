//! RSS 2.0 / Atom feed indexing.
//!
//! Turns a feed into the list of article URLs it links to, so a batch run can
//! start from a feed instead of a URL file. Relative links are resolved
//! against the feed URL.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0} for feed")]
    Status(StatusCode),

    #[error("feed is not valid RSS or Atom: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("invalid feed URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn article_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .and_then(|l| l.href.as_deref())
    }
}

/// Download `feed_url` and return the article URLs it lists, in feed order.
#[instrument(level = "info", skip(client))]
pub async fn index_feed(client: &Client, feed_url: &str) -> Result<Vec<String>, FeedError> {
    let base = Url::parse(feed_url)?;
    let response = client.get(base.clone()).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(FeedError::Status(status));
    }
    let xml = response.text().await?;
    let urls = parse_feed(&xml, &base)?;
    info!(count = urls.len(), "Indexed feed article URLs");
    debug!(?urls, "Feed URLs");
    Ok(urls)
}

/// Extract article links from an RSS 2.0 or Atom document.
pub fn parse_feed(xml: &str, base: &Url) -> Result<Vec<String>, FeedError> {
    let links: Vec<String> = match quick_xml::de::from_str::<Rss>(xml) {
        Ok(rss) => rss
            .channel
            .items
            .into_iter()
            .filter_map(|item| item.link)
            .collect(),
        Err(rss_error) => match quick_xml::de::from_str::<AtomFeed>(xml) {
            Ok(feed) => feed
                .entries
                .iter()
                .filter_map(|entry| entry.article_link().map(str::to_string))
                .collect(),
            Err(_) => return Err(rss_error.into()),
        },
    };

    Ok(links
        .iter()
        .map(|link| link.trim())
        .filter(|link| !link.is_empty())
        .filter_map(|link| base.join(link).ok())
        .map(|url| url.to_string())
        .collect())
}
