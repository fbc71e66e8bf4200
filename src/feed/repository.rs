//! Feed and feed-follow repositories for gator.

use chrono::Utc;
use uuid::Uuid;

use super::types::{Feed, FeedFollow, FeedFollowDetails, FeedWithCreator, NewFeed};
use crate::db::{now_timestamp, parse_timestamp, DbPool};
use crate::{GatorError, Result};

const FEED_COLUMNS: &str = "id, name, url, user_id, last_fetched_at, created_at, updated_at";

/// Row type for feeds.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: Uuid,
    name: String,
    url: String,
    user_id: Uuid,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_timestamp(&s)),
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Row type for feeds joined with the creator's name.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedWithCreatorRow {
    #[sqlx(flatten)]
    feed: FeedRow,
    user_name: String,
}

impl From<FeedWithCreatorRow> for FeedWithCreator {
    fn from(row: FeedWithCreatorRow) -> Self {
        FeedWithCreator {
            feed: Feed::from(row.feed),
            user_name: row.user_name,
        }
    }
}

/// Row type for feed follows.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedFollowRow {
    id: Uuid,
    user_id: Uuid,
    feed_id: Uuid,
    created_at: String,
    updated_at: String,
}

impl From<FeedFollowRow> for FeedFollow {
    fn from(row: FeedFollowRow) -> Self {
        FeedFollow {
            id: row.id,
            user_id: row.user_id,
            feed_id: row.feed_id,
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new feed.
    ///
    /// Returns [`GatorError::Duplicate`] if the URL is already registered.
    pub async fn create(&self, feed: &NewFeed) -> Result<Feed> {
        let id = Uuid::new_v4();
        let now = now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO feeds (id, name, url, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&feed.name)
        .bind(&feed.url)
        .bind(feed.user_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| GatorError::NotFound("feed".into()))
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Feed>> {
        let query = format!("SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?");
        let row = sqlx::query_as::<_, FeedRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Feed::from))
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let query = format!("SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?");
        let row = sqlx::query_as::<_, FeedRow>(&query)
            .bind(url)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Feed::from))
    }

    /// List all feeds with their creator's name, in registration order.
    pub async fn list_with_creator(&self) -> Result<Vec<FeedWithCreator>> {
        let rows = sqlx::query_as::<_, FeedWithCreatorRow>(
            r#"
            SELECT f.id, f.name, f.url, f.user_id, f.last_fetched_at,
                   f.created_at, f.updated_at, u.name AS user_name
            FROM feeds f
            JOIN users u ON u.id = f.user_id
            ORDER BY f.created_at ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(FeedWithCreator::from).collect())
    }

    /// Get the most stale feed: never-fetched first, then oldest fetch.
    pub async fn get_next_to_fetch(&self) -> Result<Option<Feed>> {
        let query = format!(
            r#"
            SELECT {FEED_COLUMNS}
            FROM feeds
            ORDER BY last_fetched_at ASC NULLS FIRST, created_at ASC
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, FeedRow>(&query)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Feed::from))
    }

    /// Set `last_fetched_at` to now.
    pub async fn mark_fetched(&self, id: Uuid) -> Result<bool> {
        let now = now_timestamp();
        let result =
            sqlx::query("UPDATE feeds SET last_fetched_at = ?, updated_at = ? WHERE id = ?")
                .bind(&now)
                .bind(&now)
                .bind(id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for feed-follow operations.
pub struct FeedFollowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedFollowRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Follow a feed.
    ///
    /// Returns [`GatorError::Duplicate`] if the user already follows it.
    pub async fn create(&self, user_id: Uuid, feed_id: Uuid) -> Result<FeedFollowDetails> {
        let id = Uuid::new_v4();
        let now = now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO feed_follows (id, user_id, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(feed_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        let follow = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| GatorError::NotFound("feed follow".into()))?;
        let (user_name, feed_name) = self.names_for(id).await?;

        Ok(FeedFollowDetails {
            follow,
            user_name,
            feed_name,
        })
    }

    /// Get a follow by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<FeedFollow>> {
        let row = sqlx::query_as::<_, FeedFollowRow>(
            "SELECT id, user_id, feed_id, created_at, updated_at FROM feed_follows WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(FeedFollow::from))
    }

    async fn names_for(&self, id: Uuid) -> Result<(String, String)> {
        let names: (String, String) = sqlx::query_as(
            r#"
            SELECT u.name, f.name
            FROM feed_follows ff
            JOIN users u ON u.id = ff.user_id
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.id = ?
            "#,
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(names)
    }

    /// Unfollow a feed. Returns false if the user was not following it.
    pub async fn delete(&self, user_id: Uuid, feed_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = ? AND feed_id = ?")
            .bind(user_id)
            .bind(feed_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Names of the feeds a user follows, in follow order.
    pub async fn list_feed_names_for_user(&self, user_id: Uuid) -> Result<Vec<String>> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT f.name
            FROM feed_follows ff
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.user_id = ?
            ORDER BY ff.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }
}
