//! RSS feed fetcher.
//!
//! Retrieves one remote feed over HTTP and parses it into an [`RssFeed`].
//! RSS 2.0 documents are read with the `rss` crate so item dates stay in
//! their raw textual form; anything else (Atom, RSS 1.0, JSON Feed) falls
//! back to `feed-rs`.
//!
//! Channel title and description are HTML-unescaped here. Item text is
//! returned as decoded from the XML and unescaped once by the normalizer.

use std::io::Cursor;
use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{GatorError, Result};
use crate::rss::types::{RssFeed, RssItem};

/// RSS feed fetcher.
#[derive(Debug, Clone)]
pub struct RssFetcher {
    client: Client,
    max_feed_size: u64,
}

impl RssFetcher {
    /// Create a new fetcher from the scraper configuration.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GatorError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
        })
    }

    /// Fetch and parse a feed from the given URL.
    pub async fn fetch(&self, url: &str) -> Result<RssFeed> {
        validate_url(url).map_err(|e| GatorError::Fetch(e.to_string()))?;

        debug!(url, "fetching feed");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GatorError::Fetch(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GatorError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(GatorError::Fetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatorError::Fetch(format!("failed to read response: {}", e)))?;

        // Chunked responses carry no content length
        if bytes.len() as u64 > self.max_feed_size {
            return Err(GatorError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        parse_feed(&bytes)
    }
}

/// Validate a feed URL.
///
/// Accepts absolute http and https URLs that name a host.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| GatorError::Validation(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(GatorError::Validation(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(GatorError::Validation("URL has no host".to_string()));
    }

    Ok(())
}

/// Parse feed bytes into an [`RssFeed`].
pub fn parse_feed(bytes: &[u8]) -> Result<RssFeed> {
    match rss::Channel::read_from(Cursor::new(bytes)) {
        Ok(channel) => Ok(from_channel(&channel)),
        Err(rss_err) => {
            debug!(error = %rss_err, "not an RSS 2.0 document, trying generic parser");
            let feed = parser::parse(bytes)
                .map_err(|e| GatorError::Fetch(format!("failed to parse feed: {}", e)))?;
            Ok(from_generic(feed))
        }
    }
}

fn from_channel(channel: &rss::Channel) -> RssFeed {
    let items = channel
        .items()
        .iter()
        .map(|item| RssItem {
            title: item.title().unwrap_or_default().to_string(),
            link: item.link().unwrap_or_default().to_string(),
            description: item.description().unwrap_or_default().to_string(),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect();

    RssFeed {
        title: unescape_html(channel.title()),
        link: channel.link().to_string(),
        description: unescape_html(channel.description()),
        items,
    }
}

fn from_generic(feed: feed_rs::model::Feed) -> RssFeed {
    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .unwrap_or_default();
            let pub_date = entry
                .published
                .or(entry.updated)
                .map(|d| d.to_rfc3339())
                .unwrap_or_default();

            RssItem {
                title,
                link,
                description,
                pub_date,
            }
        })
        .collect();

    RssFeed {
        title: unescape_html(&feed.title.map(|t| t.content).unwrap_or_default()),
        link: feed
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        description: unescape_html(&feed.description.map(|d| d.content).unwrap_or_default()),
        items,
    }
}

/// Decode HTML character references.
///
/// Markup is left in place; only entities are replaced. Unknown or
/// malformed references are kept verbatim.
pub fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
