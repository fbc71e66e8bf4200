//! RSS types for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum length for a post description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 10000;

/// Default maximum feed size in bytes (5MB).
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// A fetched and parsed feed document.
#[derive(Debug, Clone, Default)]
pub struct RssFeed {
    /// Channel title (HTML-unescaped).
    pub title: String,
    /// Channel link.
    pub link: String,
    /// Channel description (HTML-unescaped).
    pub description: String,
    /// Items in document order.
    pub items: Vec<RssItem>,
}

/// A single feed item before normalization.
#[derive(Debug, Clone, Default)]
pub struct RssItem {
    /// Item title as decoded from the XML, entities still escaped.
    pub title: String,
    /// Item link.
    pub link: String,
    /// Item description as decoded from the XML, entities still escaped.
    pub description: String,
    /// Publication date exactly as the document carries it.
    pub pub_date: String,
}

/// A stored post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Post ID.
    pub id: Uuid,
    /// Title, if the item had a non-empty one.
    pub title: Option<String>,
    /// Post URL (globally unique).
    pub url: String,
    /// Description, if the item had a non-empty one.
    pub description: Option<String>,
    /// Publication time, if the item's date could be parsed.
    pub published_at: Option<DateTime<Utc>>,
    /// Feed this post came from.
    pub feed_id: Uuid,
    /// When the post was stored.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}

/// New post for creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    /// Feed ID.
    pub feed_id: Uuid,
    /// Post URL.
    pub url: String,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Publication time.
    pub published_at: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Create a new post with only the required fields.
    pub fn new(feed_id: Uuid, url: impl Into<String>) -> Self {
        Self {
            feed_id,
            url: url.into(),
            title: None,
            description: None,
            published_at: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the publication time.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }
}

/// A post together with the name of its feed, for browsing.
#[derive(Debug, Clone)]
pub struct PostWithFeed {
    /// The post.
    pub post: Post,
    /// Name of the feed the post belongs to.
    pub feed_name: String,
}
