//! Post normalization.
//!
//! Turns a raw [`RssItem`] into a [`NewPost`]: the publication date is
//! resolved against a fixed list of layouts and the text fields are
//! unescaped and collapsed to `None` when empty.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::error::{GatorError, Result};
use crate::rss::fetcher::unescape_html;
use crate::rss::types::{NewPost, RssItem, MAX_DESCRIPTION_LENGTH};

/// A publication date layout, tried in declaration order.
///
/// Both RFC 1123 layouts accept single-digit days and an optional leading
/// weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `Mon, 02 Jan 2006 15:04:05 -0700`
    Rfc1123NumericZone,
    /// `Mon, 02 Jan 2006 15:04:05 MST`
    Rfc1123NamedZone,
    /// `2006-01-02T15:04:05+07:00`
    Rfc3339,
    /// `2006-01-02T15:04:05Z`
    Iso8601Utc,
    /// `2006-01-02 15:04:05`, taken as UTC
    SqlUtc,
}

/// Layouts in the order they are tried.
pub const DATE_LAYOUTS: [DateLayout; 5] = [
    DateLayout::Rfc1123NumericZone,
    DateLayout::Rfc1123NamedZone,
    DateLayout::Rfc3339,
    DateLayout::Iso8601Utc,
    DateLayout::SqlUtc,
];

const RFC1123_BODY: &str = "%d %b %Y %H:%M:%S";

impl DateLayout {
    /// Parse `input` with this layout.
    pub fn parse(self, input: &str) -> Option<DateTime<Utc>> {
        match self {
            DateLayout::Rfc1123NumericZone => {
                let body = strip_weekday(input);
                DateTime::parse_from_str(body, &format!("{RFC1123_BODY} %z"))
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            DateLayout::Rfc1123NamedZone => {
                let body = strip_weekday(input);
                let (datetime, zone) = body.rsplit_once(' ')?;
                let offset = zone_offset(zone)?;
                let naive = NaiveDateTime::parse_from_str(datetime, RFC1123_BODY).ok()?;
                offset
                    .from_local_datetime(&naive)
                    .single()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            DateLayout::Rfc3339 => DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateLayout::Iso8601Utc => {
                NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%SZ")
                    .ok()
                    .map(|naive| naive.and_utc())
            }
            DateLayout::SqlUtc => NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc()),
        }
    }
}

fn strip_weekday(input: &str) -> &str {
    match input.split_once(", ") {
        Some((day, rest)) if !day.is_empty() && day.chars().all(|c| c.is_ascii_alphabetic()) => {
            rest
        }
        _ => input,
    }
}

/// Offset for a zone abbreviation.
///
/// Unknown alphabetic abbreviations resolve to UTC.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let hours = match zone.to_ascii_uppercase().as_str() {
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600)
}

/// Resolve a raw publication date.
///
/// Returns the first layout that parses, or `None` when the string is
/// empty or matches no layout.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_LAYOUTS.iter().find_map(|layout| layout.parse(raw))
}

fn non_empty(text: &str) -> Option<String> {
    let unescaped = unescape_html(text);
    let trimmed = unescaped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn truncate_description(text: String) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_LENGTH {
        text
    } else {
        text.chars().take(MAX_DESCRIPTION_LENGTH).collect()
    }
}

/// Convert a raw item into a post for `feed_id`.
///
/// Fails only when the item has no link.
pub fn normalize_item(item: &RssItem, feed_id: Uuid) -> Result<NewPost> {
    let url = item.link.trim();
    if url.is_empty() {
        return Err(GatorError::Validation("item has no link".to_string()));
    }

    Ok(NewPost {
        feed_id,
        url: url.to_string(),
        title: non_empty(&item.title),
        description: non_empty(&item.description).map(truncate_description),
        published_at: parse_pub_date(&item.pub_date),
    })
}
