//! gator - a command-line feed aggregator
//!
//! Users register, follow RSS and Atom feeds and browse the collected
//! posts. A background scraper keeps feeds fresh by fetching the most
//! stale one on every tick.

pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;
pub mod rss;
pub mod settings;

pub use command::{default_commands, middleware_logged_in, Command, Commands, Handler, State};
pub use config::{Config, MarkPolicy};
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{GatorError, Result};
pub use feed::{Feed, FeedFollowRepository, FeedRepository, NewFeed};
pub use rss::{
    ingest_items, IngestReport, Post, PostRepository, RssFetcher, ScrapeOutcome, Scraper,
    ScraperHandle,
};
pub use settings::Settings;
