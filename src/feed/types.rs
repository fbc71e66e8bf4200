//! Feed types for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    /// Feed ID.
    pub id: Uuid,
    /// Display name chosen by the creator.
    pub name: String,
    /// Feed URL (unique).
    pub url: String,
    /// User who registered the feed.
    pub user_id: Uuid,
    /// Last time a fetch was attempted. `None` means never.
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// When the feed was created.
    pub created_at: DateTime<Utc>,
    /// When the feed was last updated.
    pub updated_at: DateTime<Utc>,
}

/// New feed for creation.
#[derive(Debug, Clone)]
pub struct NewFeed {
    /// Display name.
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// Creator's user ID.
    pub user_id: Uuid,
}

impl NewFeed {
    /// Create a new feed request.
    pub fn new(name: impl Into<String>, url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user_id,
        }
    }
}

/// Feed listed together with its creator's name.
#[derive(Debug, Clone)]
pub struct FeedWithCreator {
    /// The feed.
    pub feed: Feed,
    /// Name of the user who created it.
    pub user_name: String,
}

/// A user's subscription to a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedFollow {
    /// Follow ID.
    pub id: Uuid,
    /// Follower.
    pub user_id: Uuid,
    /// Followed feed.
    pub feed_id: Uuid,
    /// When the follow was created.
    pub created_at: DateTime<Utc>,
    /// When the follow was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A follow with the user and feed names resolved, for display.
#[derive(Debug, Clone)]
pub struct FeedFollowDetails {
    /// The follow row.
    pub follow: FeedFollow,
    /// Follower's name.
    pub user_name: String,
    /// Followed feed's name.
    pub feed_name: String,
}
