//! E2E tests for the authentication flow and session handling

mod common;

use common::TestServer;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let response = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_login_page_offers_google_sign_in() {
    let server = TestServer::new().await;

    let response = server.client.get(server.url("/login")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("Sign in with Google"));
    assert!(body.contains("/auth/google"));
}

#[tokio::test]
async fn test_google_redirect_sets_state_cookie() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/auth/google"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());

    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
    assert!(location.contains("client_id=test-client-id"));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("state="));

    let set_cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(set_cookie.starts_with("oauth_state="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_callback_without_state_cookie_is_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/auth/google/callback?code=abc&state=xyz"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_callback_with_mismatched_state_is_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/auth/google/callback?code=abc&state=attacker"))
        .header("Cookie", "oauth_state=expected")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_session_cookie_authenticates_requests() {
    let server = TestServer::new().await;
    let user = server.create_test_user("google-123", "Test User").await;
    let token = server.session_token_for(&user);

    let response = server
        .client
        .get(server.url("/stories"))
        .header("Cookie", format!("session={}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_garbage_session_token_is_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/stories"))
        .header("Cookie", "session=not.a-real-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_session_for_deleted_user_is_rejected() {
    // The bridge resolves the user on every request; a token whose
    // record no longer exists must fail, not fall back to a default.
    let server = TestServer::new().await;
    let user = server.create_test_user("google-123", "Test User").await;
    let mut ghost = user.clone();
    ghost.id = "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string();
    let token = server.session_token_for(&ghost);

    let response = server
        .client
        .get(server.url("/stories"))
        .header("Cookie", format!("session={}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let server = TestServer::new().await;
    let user = server.create_test_user("google-123", "Test User").await;
    let token = server.session_token_for(&user);

    let response = server
        .client
        .post(server.url("/logout"))
        .header("Cookie", format!("session={}", token))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()["location"], "/login");

    let set_cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.to_ascii_lowercase().contains("max-age=0") || set_cookie.contains("1970"));
}

#[tokio::test]
async fn test_metrics_endpoint_is_exposed() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}
