//! Scrape scheduler for gator.
//!
//! Each cycle picks the single most stale feed, records the attempt,
//! fetches it and ingests its items. [`Scraper::spawn`] runs cycles on a
//! fixed interval in a background task until its [`ScraperHandle`] is
//! stopped.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{MarkPolicy, ScraperConfig};
use crate::db::Database;
use crate::error::{GatorError, Result};
use crate::feed::{Feed, FeedRepository};
use crate::rss::fetcher::RssFetcher;
use crate::rss::ingest::{ingest_items, IngestReport};

/// Result of a single scrape cycle.
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    /// There were no feeds to scrape.
    Idle,
    /// A feed was fetched and its items ingested.
    Ingested {
        /// The feed that was scraped.
        feed: Feed,
        /// What happened to its items.
        report: IngestReport,
    },
}

/// Feed scrape scheduler.
#[derive(Debug, Clone)]
pub struct Scraper {
    db: Database,
    fetcher: RssFetcher,
    interval: Duration,
    mark_policy: MarkPolicy,
}

impl Scraper {
    /// Create a scraper using the interval and fetch settings in `config`.
    pub fn new(db: Database, config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            db,
            fetcher: RssFetcher::new(config)?,
            interval: config.interval()?,
            mark_policy: config.mark_policy,
        })
    }

    /// Override the time between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Time between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run exactly one cycle.
    ///
    /// Fetch failures are returned to the caller. With
    /// [`MarkPolicy::BeforeFetch`] the feed has already been marked when
    /// that happens.
    pub async fn scrape_once(&self) -> Result<ScrapeOutcome> {
        let feeds = FeedRepository::new(self.db.pool());

        let Some(feed) = feeds.get_next_to_fetch().await? else {
            debug!("no feeds to scrape");
            return Ok(ScrapeOutcome::Idle);
        };

        if self.mark_policy == MarkPolicy::BeforeFetch {
            feeds.mark_fetched(feed.id).await?;
        }

        info!(feed = %feed.name, url = %feed.url, "scraping feed");
        let parsed = self.fetcher.fetch(&feed.url).await?;

        if self.mark_policy == MarkPolicy::AfterFetch {
            feeds.mark_fetched(feed.id).await?;
        }

        let report = ingest_items(self.db.pool(), feed.id, &parsed.items).await;
        info!(
            feed = %feed.name,
            inserted = report.inserted,
            duplicates = report.duplicates,
            failed = report.failed,
            "feed scraped"
        );

        Ok(ScrapeOutcome::Ingested { feed, report })
    }

    /// Run cycles in a background task until the returned handle is stopped.
    ///
    /// The first cycle starts immediately. A stop request also cancels a
    /// cycle that is in flight.
    pub fn spawn(self) -> ScraperHandle {
        let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
        let join = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!("scraper started (interval: {:?})", self.interval);

            loop {
                tokio::select! {
                    _ = cancel_rx.recv() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = cancel_rx.recv() => break,
                            result = self.scrape_once() => {
                                if let Err(e) = result {
                                    warn!(error = %e, "scrape cycle failed");
                                }
                            }
                        }
                    }
                }
            }

            info!("scraper stopped");
        });

        ScraperHandle { cancel_tx, join }
    }
}

/// Handle to a running scraper task.
#[derive(Debug)]
pub struct ScraperHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl ScraperHandle {
    /// Signal the scraper to stop and wait for the task to finish.
    pub async fn stop(self) -> Result<()> {
        let _ = self.cancel_tx.send(());
        self.join
            .await
            .map_err(|e| GatorError::Task(e.to_string()))
    }

    /// Whether the task has already exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
