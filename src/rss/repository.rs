//! Post repository for gator.

use chrono::Utc;
use uuid::Uuid;

use super::types::{NewPost, Post, PostWithFeed};
use crate::db::{format_timestamp, now_timestamp, parse_timestamp, DbPool};
use crate::{GatorError, Result};

const POST_COLUMNS: &str =
    "p.id, p.title, p.url, p.description, p.published_at, p.feed_id, p.created_at, p.updated_at";

/// Row type for posts.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: Option<String>,
    url: String,
    description: Option<String>,
    published_at: Option<String>,
    feed_id: Uuid,
    created_at: String,
    updated_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            url: row.url,
            description: row.description,
            published_at: row.published_at.and_then(|s| parse_timestamp(&s)),
            feed_id: row.feed_id,
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Row type for posts joined with their feed name.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostWithFeedRow {
    #[sqlx(flatten)]
    post: PostRow,
    feed_name: String,
}

impl From<PostWithFeedRow> for PostWithFeed {
    fn from(row: PostWithFeedRow) -> Self {
        PostWithFeed {
            post: Post::from(row.post),
            feed_name: row.feed_name,
        }
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a new post.
    ///
    /// Returns [`GatorError::Duplicate`] if a post with the same URL exists.
    pub async fn create(&self, post: &NewPost) -> Result<Post> {
        let id = Uuid::new_v4();
        let now = now_timestamp();
        let published_at = post.published_at.as_ref().map(format_timestamp);

        sqlx::query(
            r#"
            INSERT INTO posts (id, title, url, description, published_at, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(&published_at)
        .bind(post.feed_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| GatorError::NotFound("post".into()))
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?");
        let row = sqlx::query_as::<_, PostRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    /// Get a post by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Post>> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.url = ?");
        let row = sqlx::query_as::<_, PostRow>(&query)
            .bind(url)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    /// Posts from the feeds a user follows, newest first.
    ///
    /// Posts without a publication date sort after dated ones; ties fall
    /// back to storage time.
    pub async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<PostWithFeed>> {
        let query = format!(
            r#"
            SELECT {POST_COLUMNS}, f.name AS feed_name
            FROM posts p
            JOIN feed_follows ff ON ff.feed_id = p.feed_id
            JOIN feeds f ON f.id = p.feed_id
            WHERE ff.user_id = ?
            ORDER BY p.published_at DESC NULLS LAST, p.created_at DESC
            LIMIT ?
            "#
        );
        let rows = sqlx::query_as::<_, PostWithFeedRow>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(PostWithFeed::from).collect())
    }

    /// Count posts stored for a feed.
    pub async fn count_by_feed(&self, feed_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE feed_id = ?")
            .bind(feed_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count all stored posts.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::feed::{FeedFollowRepository, FeedRepository, NewFeed};
    use crate::Database;
    use chrono::{TimeZone, Utc};

    struct Fixture {
        db: Database,
        user_id: Uuid,
        feed_id: Uuid,
    }

    async fn setup() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let user_id = UserRepository::new(db.pool())
            .create(&NewUser::new("alice"))
            .await
            .unwrap()
            .id;
        let feed_id = FeedRepository::new(db.pool())
            .create(&NewFeed::new("Example", "https://example.com/feed", user_id))
            .await
            .unwrap()
            .id;
        FeedFollowRepository::new(db.pool())
            .create(user_id, feed_id)
            .await
            .unwrap();

        Fixture {
            db,
            user_id,
            feed_id,
        }
    }

    #[tokio::test]
    async fn test_create_post() {
        let fx = setup().await;
        let repo = PostRepository::new(fx.db.pool());
        let published = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

        let post = repo
            .create(
                &NewPost::new(fx.feed_id, "https://example.com/1")
                    .with_title("Hello")
                    .with_published_at(published),
            )
            .await
            .unwrap();

        assert_eq!(post.url, "https://example.com/1");
        assert_eq!(post.title.as_deref(), Some("Hello"));
        assert!(post.description.is_none());
        assert_eq!(post.published_at, Some(published));
        assert_eq!(post.feed_id, fx.feed_id);
    }

    #[tokio::test]
    async fn test_create_duplicate_url() {
        let fx = setup().await;
        let repo = PostRepository::new(fx.db.pool());

        let post = NewPost::new(fx.feed_id, "https://example.com/1");
        repo.create(&post).await.unwrap();
        let result = repo.create(&post.clone().with_title("again")).await;

        assert!(matches!(result, Err(GatorError::Duplicate(_))));
        assert_eq!(repo.count_by_feed(fx.feed_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_url() {
        let fx = setup().await;
        let repo = PostRepository::new(fx.db.pool());

        let created = repo
            .create(&NewPost::new(fx.feed_id, "https://example.com/1"))
            .await
            .unwrap();

        let found = repo.get_by_url("https://example.com/1").await.unwrap();
        assert_eq!(found, Some(created));
        assert!(repo.get_by_url("https://example.com/2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let fx = setup().await;
        let repo = PostRepository::new(fx.db.pool());

        let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        repo.create(&NewPost::new(fx.feed_id, "https://example.com/undated"))
            .await
            .unwrap();
        repo.create(&NewPost::new(fx.feed_id, "https://example.com/old").with_published_at(older))
            .await
            .unwrap();
        repo.create(&NewPost::new(fx.feed_id, "https://example.com/new").with_published_at(newer))
            .await
            .unwrap();

        let posts = repo.list_for_user(fx.user_id, 10).await.unwrap();
        let urls: Vec<&str> = posts.iter().map(|p| p.post.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/new",
                "https://example.com/old",
                "https://example.com/undated"
            ]
        );
        assert!(posts.iter().all(|p| p.feed_name == "Example"));

        let limited = repo.list_for_user(fx.user_id, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].post.url, "https://example.com/new");
    }

    #[tokio::test]
    async fn test_list_for_user_only_followed_feeds() {
        let fx = setup().await;
        let pool = fx.db.pool();
        let repo = PostRepository::new(pool);

        let bob = UserRepository::new(pool)
            .create(&NewUser::new("bob"))
            .await
            .unwrap();
        repo.create(&NewPost::new(fx.feed_id, "https://example.com/1"))
            .await
            .unwrap();

        assert!(repo.list_for_user(bob.id, 10).await.unwrap().is_empty());
        assert_eq!(repo.list_for_user(fx.user_id, 10).await.unwrap().len(), 1);
    }
}
