//! Configuration module for gator.
//!
//! Application behaviour (logging, scraping, browsing) is read from a TOML
//! file. The logged-in user and database URL live separately in
//! [`crate::settings`].

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::rss::MAX_FEED_SIZE;
use crate::{GatorError, Result};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "gator.toml";

/// When the scraper records a fetch attempt on the selected feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkPolicy {
    /// Mark the feed before the network fetch. A failed fetch is not
    /// retried until the feed comes round again.
    #[default]
    BeforeFetch,
    /// Mark the feed only after the fetch succeeded.
    AfterFetch,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file. Logs always go to stderr as well.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Scraper configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Time between scrape cycles (e.g. "10s", "1m30s").
    #[serde(default = "default_scrape_interval")]
    pub interval: String,
    /// User-Agent header sent with every feed request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// When to mark the selected feed as fetched.
    #[serde(default)]
    pub mark_policy: MarkPolicy,
}

fn default_scrape_interval() -> String {
    "10s".to_string()
}

fn default_user_agent() -> String {
    "gator".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    MAX_FEED_SIZE
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            interval: default_scrape_interval(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            mark_policy: MarkPolicy::default(),
        }
    }
}

impl ScraperConfig {
    /// Parsed scrape interval.
    pub fn interval(&self) -> Result<Duration> {
        parse_duration(&self.interval)
    }
}

/// Browse configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowseConfig {
    /// Number of posts shown when `browse` is run without a limit.
    #[serde(default = "default_browse_limit")]
    pub default_limit: i64,
}

fn default_browse_limit() -> i64 {
    2
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            default_limit: default_browse_limit(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scraper configuration.
    #[serde(default)]
    pub scraper: ScraperConfig,
    /// Browse configuration.
    #[serde(default)]
    pub browse: BrowseConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| GatorError::Config(e.to_string()))?;
        config.scraper.interval()?;
        Ok(config)
    }
}

/// Parse a duration such as `10s`, `500ms`, `1m30s` or `2h`.
///
/// A bare integer is taken as seconds. Zero durations are rejected since a
/// zero-period ticker would spin.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return Err(GatorError::Validation("empty duration".to_string()));
    }

    if let Ok(secs) = s.parse::<u64>() {
        return non_zero(Duration::from_secs(secs), input);
    }

    let duration = humantime::parse_duration(s)
        .map_err(|e| GatorError::Validation(format!("invalid duration {input}: {e}")))?;
    non_zero(duration, input)
}

fn non_zero(duration: Duration, input: &str) -> Result<Duration> {
    if duration.is_zero() {
        return Err(GatorError::Validation(format!(
            "duration must be positive: {input}"
        )));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert_eq!(config.scraper.interval, "10s");
        assert_eq!(config.scraper.user_agent, "gator");
        assert_eq!(config.scraper.mark_policy, MarkPolicy::BeforeFetch);
        assert_eq!(config.browse.default_limit, 2);
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r#"
            [scraper]
            interval = "1m"
            mark_policy = "after_fetch"
            "#,
        )
        .unwrap();
        assert_eq!(config.scraper.interval().unwrap(), Duration::from_secs(60));
        assert_eq!(config.scraper.mark_policy, MarkPolicy::AfterFetch);
        // Untouched sections keep their defaults
        assert_eq!(config.scraper.user_agent, "gator");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_rejects_bad_interval() {
        let result = Config::parse("[scraper]\ninterval = \"soon\"\n");
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("[scraper\n");
        assert!(matches!(result, Err(GatorError::Config(_))));
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("15").unwrap(), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("s10").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("0").is_err());
    }

    #[test]
    fn test_parse_duration_overflow() {
        for input in [
            "5124095576030432h",
            "18446744073709551615s1s",
            "99999999999999999999",
        ] {
            assert!(
                matches!(parse_duration(input), Err(GatorError::Validation(_))),
                "{input} should be rejected"
            );
        }
    }
}
