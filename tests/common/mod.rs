//! Common test utilities for E2E tests

use chrono::Utc;
use fireside::auth::session::{Session, create_session_token};
use fireside::data::{EntityId, Story, User};
use fireside::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "test.example.com".to_string(),
                protocol: "https".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            auth: config::AuthConfig {
                session_secret: TEST_SESSION_SECRET.to_string(),
                session_max_age: 604800,
                google: config::GoogleOAuthConfig {
                    client_id: "test-client-id".to_string(),
                    client_secret: "test-client-secret".to_string(),
                    redirect_path: "/auth/google/callback".to_string(),
                },
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client; redirects stay visible to assertions
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = fireside::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create a test user in the database
    pub async fn create_test_user(&self, google_id: &str, display_name: &str) -> User {
        let user = User {
            id: EntityId::new().0,
            google_id: google_id.to_string(),
            display_name: display_name.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            image_url: None,
            created_at: Utc::now(),
        };

        self.state.db.insert_user(&user).await.unwrap();
        user
    }

    /// Mint a session token for a user, as the OAuth callback would
    pub fn session_token_for(&self, user: &User) -> String {
        let session = Session::for_user(&user.id, 3600);
        create_session_token(&session, TEST_SESSION_SECRET).unwrap()
    }

    /// Insert a story directly into the database
    pub async fn insert_story(&self, owner: &User, title: &str, status: &str) -> Story {
        let story = Story {
            id: EntityId::new().0,
            title: title.to_string(),
            body: "Once upon a time...".to_string(),
            status: status.to_string(),
            user_id: owner.id.clone(),
            image_url: None,
            created_at: Utc::now(),
        };

        self.state.db.insert_story(&story).await.unwrap();
        story
    }
}
