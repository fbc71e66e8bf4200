//! Feed ingestion pipeline for gator.
//!
//! Fetching, normalizing and storing posts, and the scheduler that drives
//! them.

pub mod fetcher;
pub mod ingest;
pub mod normalize;
pub mod repository;
pub mod scraper;
pub mod types;

pub use fetcher::{parse_feed, unescape_html, validate_url, RssFetcher};
pub use ingest::{ingest_items, IngestReport};
pub use normalize::{normalize_item, parse_pub_date, DateLayout, DATE_LAYOUTS};
pub use repository::PostRepository;
pub use scraper::{ScrapeOutcome, Scraper, ScraperHandle};
pub use types::{
    NewPost, Post, PostWithFeed, RssFeed, RssItem, MAX_DESCRIPTION_LENGTH, MAX_FEED_SIZE,
};
