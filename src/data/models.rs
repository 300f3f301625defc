//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User
// =============================================================================

/// A local identity record bound to a Google account
///
/// Created on first sign-in, immutable afterwards. At most one
/// record exists per `google_id` (unique index in the schema).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    /// Identifier issued by Google; natural key for the sign-in upsert
    pub google_id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    /// First photo URL from the Google profile
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Story
// =============================================================================

/// Visibility of a story
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryStatus {
    Public,
    Private,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Parse a status string, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

impl Default for StoryStatus {
    fn default() -> Self {
        Self::Public
    }
}

/// A user-authored story
///
/// `user_id` is always set from the authenticated session at creation;
/// deleting a User does not cascade to their stories.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Visibility: public, private
    pub status: String,
    /// Owning user's id
    pub user_id: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A story joined with its owner's display fields
///
/// Used by listing and show endpoints so clients never need a
/// second lookup for the author.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoryWithOwner {
    pub id: String,
    pub title: String,
    pub body: String,
    pub status: String,
    pub user_id: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner_display_name: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub owner_image_url: Option<String>,
}
