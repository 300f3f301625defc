//! SQLite database operations
//!
//! All database access goes through this module.
//! Schema changes live in `./migrations` and run automatically on connect.

use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::{Story, StoryWithOwner, User};
use crate::error::AppError;
use crate::metrics::DB_QUERIES_TOTAL;

/// Columns selected for story+owner joins.
///
/// Owner fields are aliased to match [`StoryWithOwner`].
const STORY_WITH_OWNER_COLUMNS: &str = "\
    s.id, s.title, s.body, s.status, s.user_id, s.image_url, s.created_at, \
    u.display_name AS owner_display_name, \
    u.first_name AS owner_first_name, \
    u.last_name AS owner_last_name, \
    u.image_url AS owner_image_url";

fn observe_query(operation: &str, table: &str) {
    DB_QUERIES_TOTAL.with_label_values(&[operation, table]).inc();
}

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        // Create connection string
        let connection_string = format!("sqlite:{}?mode=rwc", path.display());

        // Create connection pool
        let pool = SqlitePool::connect(&connection_string).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Get user by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        observe_query("select", "users");
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by Google profile id (the sign-in natural key)
    pub async fn get_user_by_google_id(&self, google_id: &str) -> Result<Option<User>, AppError> {
        observe_query("select", "users");
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE google_id = ?")
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Insert a new user
    ///
    /// The unique index on `google_id` makes a concurrent first sign-in
    /// surface as a unique-constraint violation; callers handle that as
    /// "record already exists" (see [`crate::service::UserService`]).
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        observe_query("insert", "users");
        sqlx::query(
            r#"
            INSERT INTO users (
                id, google_id, display_name, first_name, last_name, image_url, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.google_id)
        .bind(&user.display_name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.image_url)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count all users
    pub async fn count_users(&self) -> Result<i64, AppError> {
        observe_query("count", "users");
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Stories
    // =========================================================================

    /// Get story by ID
    pub async fn get_story(&self, id: &str) -> Result<Option<Story>, AppError> {
        observe_query("select", "stories");
        let story = sqlx::query_as::<_, Story>("SELECT * FROM stories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(story)
    }

    /// Get story by ID joined with its owner's display fields
    pub async fn get_story_with_owner(&self, id: &str) -> Result<Option<StoryWithOwner>, AppError> {
        observe_query("select", "stories");
        let query = format!(
            "SELECT {STORY_WITH_OWNER_COLUMNS} \
             FROM stories s JOIN users u ON u.id = s.user_id \
             WHERE s.id = ?"
        );

        let story = sqlx::query_as::<_, StoryWithOwner>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(story)
    }

    /// List all public stories, newest first
    ///
    /// Ties on `created_at` are broken by id descending; ULIDs are
    /// time-sortable, so the order is stable.
    pub async fn list_public_stories(&self) -> Result<Vec<StoryWithOwner>, AppError> {
        observe_query("select", "stories");
        let query = format!(
            "SELECT {STORY_WITH_OWNER_COLUMNS} \
             FROM stories s JOIN users u ON u.id = s.user_id \
             WHERE s.status = 'public' \
             ORDER BY s.created_at DESC, s.id DESC"
        );

        let stories = sqlx::query_as::<_, StoryWithOwner>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(stories)
    }

    /// List public stories owned by one user, newest first
    ///
    /// An unknown user id yields an empty list, not an error.
    pub async fn list_public_stories_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<StoryWithOwner>, AppError> {
        observe_query("select", "stories");
        let query = format!(
            "SELECT {STORY_WITH_OWNER_COLUMNS} \
             FROM stories s JOIN users u ON u.id = s.user_id \
             WHERE s.user_id = ? AND s.status = 'public' \
             ORDER BY s.created_at DESC, s.id DESC"
        );

        let stories = sqlx::query_as::<_, StoryWithOwner>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(stories)
    }

    /// Insert a new story
    pub async fn insert_story(&self, story: &Story) -> Result<(), AppError> {
        observe_query("insert", "stories");
        sqlx::query(
            r#"
            INSERT INTO stories (
                id, title, body, status, user_id, image_url, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&story.id)
        .bind(&story.title)
        .bind(&story.body)
        .bind(&story.status)
        .bind(&story.user_id)
        .bind(&story.image_url)
        .bind(story.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update an existing story
    ///
    /// `user_id` and `created_at` are never rewritten.
    pub async fn update_story(&self, story: &Story) -> Result<(), AppError> {
        observe_query("update", "stories");
        sqlx::query(
            r#"
            UPDATE stories
            SET title = ?, body = ?, status = ?, image_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&story.title)
        .bind(&story.body)
        .bind(&story.status)
        .bind(&story.image_url)
        .bind(&story.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete story by ID
    pub async fn delete_story(&self, id: &str) -> Result<(), AppError> {
        observe_query("delete", "stories");
        sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Count all stories
    pub async fn count_stories(&self) -> Result<i64, AppError> {
        observe_query("count", "stories");
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
