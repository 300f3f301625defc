//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database operations and enforce ownership.

mod story;
mod user;

pub use story::{StoryDraft, StoryService, can_modify};
pub use user::{GoogleProfile, UserService};
