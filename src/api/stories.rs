//! Story endpoints
//!
//! CRUD over stories for the authenticated user. List and show
//! endpoints return the story joined with its owner's display fields.

use axum::{
    Router,
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::{CurrentUser, require_auth};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::{StoryDraft, StoryService, can_modify};

/// Create stories router
///
/// Every route requires an authenticated session; the middleware
/// resolves the session cookie to a full User record up front.
pub fn stories_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stories/add", get(add_story_form))
        .route("/stories", get(list_public_stories).post(create_story))
        .route("/stories/user/:user_id", get(list_stories_by_user))
        .route("/stories/edit/:id", get(edit_story_form))
        .route(
            "/stories/:id",
            get(show_story).put(update_story).delete(delete_story),
        )
        .layer(axum::middleware::from_fn_with_state(state, require_auth))
}

/// Story form fields
///
/// `user` is accepted but never trusted; ownership always comes
/// from the session.
#[derive(Debug, Deserialize)]
pub struct StoryForm {
    pub title: String,
    pub body: String,
    pub status: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, rename = "user")]
    pub _user: Option<String>,
}

impl From<StoryForm> for StoryDraft {
    fn from(form: StoryForm) -> Self {
        StoryDraft {
            title: form.title,
            body: form.body,
            status: form.status,
            image_url: form.image_url,
        }
    }
}

fn build_story_service(state: &AppState) -> StoryService {
    StoryService::new(state.db.clone())
}

// =============================================================================
// Forms
// =============================================================================

/// GET /stories/add
///
/// Renders the story creation form.
async fn add_story_form(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Html(format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head><title>Add Story - Fireside</title></head>
        <body>
            <h1>Add Story</h1>
            <p>Signed in as {}</p>
            <form method="POST" action="/stories">
                <input type="text" name="title" placeholder="Title" required>
                <textarea name="body" placeholder="Tell your story..." required></textarea>
                <select name="status">
                    <option value="public" selected>Public</option>
                    <option value="private">Private</option>
                </select>
                <input type="url" name="image_url" placeholder="Image URL (optional)">
                <button type="submit">Save</button>
            </form>
        </body>
        </html>
    "#,
        html_escape::encode_text(&user.display_name)
    ))
}

/// GET /stories/edit/:id
///
/// Returns the story for editing. Non-owners are redirected to the
/// story list without receiving any story data; a missing story is 404.
async fn edit_story_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let story = build_story_service(&state).get(&id).await?;

    if !can_modify(&user, &story) {
        return Ok(Redirect::to("/stories").into_response());
    }

    Ok(axum::Json(story).into_response())
}

// =============================================================================
// CRUD
// =============================================================================

/// POST /stories
///
/// Creates a story owned by the session user and redirects to the
/// story list. Any `user` field in the payload is discarded.
async fn create_story(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<StoryForm>,
) -> Result<Redirect, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/stories"])
        .start_timer();

    let story = build_story_service(&state)
        .create(&user, form.into())
        .await?;

    tracing::info!(story_id = %story.id, user_id = %user.id, "Story created");
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/stories", "303"])
        .inc();

    Ok(Redirect::to("/stories"))
}

/// GET /stories
///
/// Lists all public stories joined with their owners, newest first.
async fn list_public_stories(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/stories"])
        .start_timer();

    let stories = build_story_service(&state).list_public().await?;
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/stories", "200"])
        .inc();

    Ok(axum::Json(stories))
}

/// GET /stories/user/:user_id
///
/// Lists one user's public stories, newest first. An unknown user id
/// yields an empty list, not an error.
async fn list_stories_by_user(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stories = build_story_service(&state)
        .list_public_by_user(&user_id)
        .await?;

    Ok(axum::Json(stories))
}

/// GET /stories/:id
///
/// Shows one story joined with its owner; 404 when absent.
async fn show_story(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let story = build_story_service(&state).get_with_owner(&id).await?;

    Ok(axum::Json(story))
}

/// PUT /stories/:id
///
/// Full replacement of a story's fields; owner only. Returns the
/// updated record.
async fn update_story(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<StoryForm>,
) -> Result<impl IntoResponse, AppError> {
    let story = build_story_service(&state)
        .update(&user, &id, form.into())
        .await?;

    Ok(axum::Json(story))
}

/// DELETE /stories/:id
///
/// Deletes a story; owner only, same predicate as update.
async fn delete_story(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    build_story_service(&state).delete(&user, &id).await?;

    tracing::info!(story_id = %id, user_id = %user.id, "Story deleted");

    Ok(Redirect::to("/stories"))
}
