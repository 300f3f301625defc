//! Story service
//!
//! Handles story operations: create, list, show, update, delete.
//! Ownership checks for mutating operations live here.

use std::sync::Arc;

use crate::data::{Database, EntityId, Story, StoryStatus, StoryWithOwner, User};
use crate::error::AppError;
use crate::metrics::STORIES_TOTAL;

/// Ownership predicate shared by edit, update, and delete.
pub fn can_modify(user: &User, story: &Story) -> bool {
    story.user_id == user.id
}

/// Caller-supplied story fields, before validation
///
/// The owner never comes from the caller; it is always taken from
/// the authenticated session.
#[derive(Debug, Clone)]
pub struct StoryDraft {
    pub title: String,
    pub body: String,
    pub status: Option<String>,
    pub image_url: Option<String>,
}

fn normalize_status(raw_status: Option<&str>) -> Result<StoryStatus, AppError> {
    let Some(raw) = raw_status.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(StoryStatus::default());
    };

    StoryStatus::parse(raw).ok_or_else(|| {
        AppError::Validation("status must be one of: public, private".to_string())
    })
}

fn normalize_required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Story service
pub struct StoryService {
    db: Arc<Database>,
}

impl StoryService {
    /// Create new story service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // =========================================================================
    // CRUD Operations
    // =========================================================================

    /// Create a new story owned by `owner`
    ///
    /// The owner id is forced from the session; any owner field in the
    /// request payload has already been discarded by the handler.
    pub async fn create(&self, owner: &User, draft: StoryDraft) -> Result<Story, AppError> {
        let title = normalize_required("title", &draft.title)?;
        let body = normalize_required("body", &draft.body)?;
        let status = normalize_status(draft.status.as_deref())?;

        let story = Story {
            id: EntityId::new().0,
            title,
            body,
            status: status.as_str().to_string(),
            user_id: owner.id.clone(),
            image_url: normalize_optional(draft.image_url),
            created_at: chrono::Utc::now(),
        };

        self.db.insert_story(&story).await?;
        STORIES_TOTAL.inc();

        Ok(story)
    }

    /// Get story by ID
    pub async fn get(&self, id: &str) -> Result<Story, AppError> {
        self.db.get_story(id).await?.ok_or(AppError::NotFound)
    }

    /// Get story by ID joined with owner fields
    pub async fn get_with_owner(&self, id: &str) -> Result<StoryWithOwner, AppError> {
        self.db
            .get_story_with_owner(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// List all public stories, newest first
    pub async fn list_public(&self) -> Result<Vec<StoryWithOwner>, AppError> {
        self.db.list_public_stories().await
    }

    /// List public stories owned by one user, newest first
    ///
    /// An unknown user id yields an empty list.
    pub async fn list_public_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<StoryWithOwner>, AppError> {
        self.db.list_public_stories_by_user(user_id).await
    }

    /// Replace a story's fields
    ///
    /// Owner-only. Ownership and creation time are never rewritten.
    pub async fn update(
        &self,
        requester: &User,
        id: &str,
        draft: StoryDraft,
    ) -> Result<Story, AppError> {
        let existing = self.get(id).await?;
        if !can_modify(requester, &existing) {
            return Err(AppError::Forbidden);
        }

        let updated = Story {
            id: existing.id,
            title: normalize_required("title", &draft.title)?,
            body: normalize_required("body", &draft.body)?,
            status: normalize_status(draft.status.as_deref())?.as_str().to_string(),
            user_id: existing.user_id,
            image_url: normalize_optional(draft.image_url),
            created_at: existing.created_at,
        };

        self.db.update_story(&updated).await?;

        Ok(updated)
    }

    /// Delete a story
    ///
    /// Owner-only, same predicate as update.
    pub async fn delete(&self, requester: &User, id: &str) -> Result<(), AppError> {
        let existing = self.get(id).await?;
        if !can_modify(requester, &existing) {
            return Err(AppError::Forbidden);
        }

        self.db.delete_story(id).await?;
        STORIES_TOTAL.dec();

        Ok(())
    }
}
