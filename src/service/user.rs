//! User service
//!
//! Handles the sign-in upsert and per-request session resolution.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::data::{Database, EntityId, User};
use crate::error::AppError;
use crate::metrics::USERS_TOTAL;

/// Profile returned by Google's userinfo endpoint
///
/// Name fields default to empty strings when Google omits them;
/// `id` is always present and is the upsert key.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    pub picture: Option<String>,
}

/// User service
pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    /// Create new user service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Resolve a session's user id to the full record.
    ///
    /// A missing record means the session refers to an identity that
    /// no longer exists; that is an authentication failure, never a
    /// substitute identity.
    pub async fn resolve_session_user(&self, user_id: &str) -> Result<User, AppError> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Find the local user for a Google profile, creating one on first sign-in.
    ///
    /// Always returns the persisted record, so identifier-based lookups
    /// on later requests are guaranteed to succeed. Concurrent first
    /// sign-ins race on the `google_id` unique index; the loser treats
    /// the conflict as "record already exists" and re-fetches.
    pub async fn find_or_create_from_profile(
        &self,
        profile: &GoogleProfile,
    ) -> Result<User, AppError> {
        if let Some(user) = self.db.get_user_by_google_id(&profile.id).await? {
            return Ok(user);
        }

        let user = User {
            id: EntityId::new().0,
            google_id: profile.id.clone(),
            display_name: profile.name.clone(),
            first_name: profile.given_name.clone(),
            last_name: profile.family_name.clone(),
            image_url: profile.picture.clone(),
            created_at: Utc::now(),
        };

        match self.db.insert_user(&user).await {
            Ok(()) => {
                USERS_TOTAL.inc();
                tracing::info!(user_id = %user.id, "New user created");
                Ok(user)
            }
            Err(AppError::Database(sqlx::Error::Database(db_err)))
                if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                // Lost the first-login race; take the row that won.
                self.db
                    .get_user_by_google_id(&profile.id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(anyhow::anyhow!(
                            "user vanished after unique-constraint conflict: {}",
                            profile.id
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }
}
