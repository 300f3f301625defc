//! Google OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with Google.

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;

use super::middleware::SESSION_COOKIE;
use super::session::{Session, create_session_token};
use crate::AppState;
use crate::error::AppError;
use crate::service::{GoogleProfile, UserService};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Cookie holding the CSRF state between redirect and callback
const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Create authentication router
///
/// Routes:
/// - GET /login - Login page
/// - GET /auth/google - Redirect to Google
/// - GET /auth/google/callback - OAuth callback
/// - POST /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/auth/google", get(google_redirect))
        .route("/auth/google/callback", get(google_callback))
        .route("/logout", axum::routing::post(logout))
}

// =============================================================================
// Login Page
// =============================================================================

/// GET /login
///
/// Renders a simple login page with Google sign-in link.
async fn login_page() -> impl IntoResponse {
    Html(
        r#"
        <!DOCTYPE html>
        <html>
        <head><title>Login - Fireside</title></head>
        <body>
            <h1>Fireside</h1>
            <p>Please sign in with Google</p>
            <a href="/auth/google">Sign in with Google</a>
        </body>
        </html>
    "#,
    )
}

// =============================================================================
// Google OAuth
// =============================================================================

/// GET /auth/google
///
/// Redirects user to Google's authorization page.
///
/// # Steps
/// 1. Generate CSRF state token
/// 2. Store state in cookie
/// 3. Redirect to Google with client_id, redirect_uri, scope, state
async fn google_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let csrf_state = generate_csrf_state();

    let mut auth_url = url::Url::parse(GOOGLE_AUTH_URL)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid Google auth URL: {e}")))?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &state.config.auth.google.client_id)
        .append_pair("redirect_uri", &state.config.google_redirect_uri())
        .append_pair("response_type", "code")
        .append_pair("scope", "profile")
        .append_pair("state", &csrf_state);

    let state_cookie = build_cookie(OAUTH_STATE_COOKIE, csrf_state, &state);

    Ok((jar.add(state_cookie), Redirect::to(auth_url.as_str())))
}

/// Query parameters from Google callback
#[derive(Debug, Deserialize)]
struct GoogleCallbackQuery {
    /// Authorization code
    code: String,
    /// CSRF state token
    state: String,
}

/// Google token response
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// GET /auth/google/callback
///
/// Handles OAuth callback from Google.
///
/// # Steps
/// 1. Verify CSRF state against the state cookie
/// 2. Exchange code for access token
/// 3. Fetch profile from Google
/// 4. Find or create the local user (upsert by Google id)
/// 5. Create session and set cookie
/// 6. Redirect to the story list
///
/// Any store or provider failure aborts the flow; nothing is retried
/// and no partial session is issued.
async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    verify_csrf_state(&query.state, &jar)?;

    let access_token = exchange_code(&state, &query.code).await?;
    let profile = fetch_profile(&state, &access_token).await?;

    // Session identity is always the persisted record, never the
    // pre-insert object, so later id lookups are guaranteed to work.
    let user = UserService::new(state.db.clone())
        .find_or_create_from_profile(&profile)
        .await?;

    tracing::info!(user_id = %user.id, "User signed in");

    let session = Session::for_user(&user.id, state.config.auth.session_max_age);
    let token = create_session_token(&session, &state.config.auth.session_secret)?;

    let jar = jar
        .remove(removal_cookie(OAUTH_STATE_COOKIE))
        .add(build_cookie(SESSION_COOKIE, token, &state));

    Ok((jar, Redirect::to("/stories")))
}

/// Exchange the authorization code for an access token.
async fn exchange_code(state: &AppState, code: &str) -> Result<String, AppError> {
    let params = [
        ("client_id", state.config.auth.google.client_id.as_str()),
        (
            "client_secret",
            state.config.auth.google.client_secret.as_str(),
        ),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", &state.config.google_redirect_uri()),
    ];

    let response = state
        .http_client
        .post(GOOGLE_TOKEN_URL)
        .form(&params)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::error!(%status, "Google token exchange failed");
        return Err(AppError::OAuth(format!(
            "token exchange failed with status {status}"
        )));
    }

    let token: GoogleTokenResponse = response.json().await?;
    Ok(token.access_token)
}

/// Fetch the signed-in user's profile from Google.
async fn fetch_profile(state: &AppState, access_token: &str) -> Result<GoogleProfile, AppError> {
    let response = state
        .http_client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::error!(%status, "Google userinfo request failed");
        return Err(AppError::OAuth(format!(
            "userinfo request failed with status {status}"
        )));
    }

    Ok(response.json::<GoogleProfile>().await?)
}

// =============================================================================
// Logout
// =============================================================================

/// POST /logout
///
/// Clears session cookie and redirects to login.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(removal_cookie(SESSION_COOKIE)),
        Redirect::to("/login"),
    )
}

// =============================================================================
// Helpers
// =============================================================================

fn build_cookie(name: &'static str, value: String, state: &AppState) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.should_use_secure_cookies())
        .build()
}

/// Removal must carry the same path the cookie was set with.
fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::from(name);
    cookie.set_path("/");
    cookie
}

/// Generate a random CSRF state token
fn generate_csrf_state() -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Verify CSRF state from cookie matches callback state
fn verify_csrf_state(state: &str, jar: &CookieJar) -> Result<(), AppError> {
    let cookie_state = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or(AppError::Unauthorized)?;

    if cookie_state != state {
        return Err(AppError::Unauthorized);
    }

    Ok(())
}
