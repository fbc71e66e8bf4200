//! User repository for gator.

use chrono::Utc;
use uuid::Uuid;

use super::user::{NewUser, User};
use super::{now_timestamp, parse_timestamp, DbPool};
use crate::{GatorError, Result};

/// Row type for users.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    created_at: String,
    updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Returns [`GatorError::Duplicate`] if the name is taken.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id = Uuid::new_v4();
        let now = now_timestamp();

        sqlx::query(
            "INSERT INTO users (id, name, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&new_user.name)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| GatorError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Get a user by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// List all user names in registration order.
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let names: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM users ORDER BY created_at ASC, name ASC")
                .fetch_all(self.pool)
                .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }
}
