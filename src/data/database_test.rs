//! Database tests

use super::*;
use chrono::{Duration, Utc};
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn test_user(google_id: &str) -> User {
    User {
        id: EntityId::new().0,
        google_id: google_id.to_string(),
        display_name: "Test User".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        image_url: Some("https://img.example/test.png".to_string()),
        created_at: Utc::now(),
    }
}

fn test_story(user_id: &str, status: &str) -> Story {
    Story {
        id: EntityId::new().0,
        title: "A night by the fire".to_string(),
        body: "Once upon a time...".to_string(),
        status: status.to_string(),
        user_id: user_id.to_string(),
        image_url: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_user_insert_and_get() {
    let (db, _temp_dir) = create_test_db().await;

    let user = test_user("google-123");
    db.insert_user(&user).await.unwrap();

    let by_id = db.get_user(&user.id).await.unwrap();
    assert!(by_id.is_some());
    assert_eq!(by_id.unwrap().display_name, "Test User");

    let by_google_id = db.get_user_by_google_id("google-123").await.unwrap();
    assert!(by_google_id.is_some());
    assert_eq!(by_google_id.unwrap().id, user.id);

    assert_eq!(db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_google_id_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;

    db.insert_user(&test_user("google-123")).await.unwrap();

    let result = db.insert_user(&test_user("google-123")).await;
    match result {
        Err(crate::error::AppError::Database(sqlx::Error::Database(db_err))) => {
            assert!(matches!(
                db_err.kind(),
                sqlx::error::ErrorKind::UniqueViolation
            ));
        }
        other => panic!("expected unique violation, got {:?}", other.map(|_| ())),
    }

    assert_eq!(db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_story_crud() {
    let (db, _temp_dir) = create_test_db().await;

    let user = test_user("google-123");
    db.insert_user(&user).await.unwrap();

    let story = test_story(&user.id, "public");
    db.insert_story(&story).await.unwrap();

    // Get by ID
    let retrieved = db.get_story(&story.id).await.unwrap();
    assert!(retrieved.is_some());
    assert_eq!(retrieved.unwrap().title, "A night by the fire");

    // Get joined with owner
    let with_owner = db.get_story_with_owner(&story.id).await.unwrap().unwrap();
    assert_eq!(with_owner.owner_display_name, "Test User");
    assert_eq!(with_owner.user_id, user.id);

    // Update
    let mut updated = story.clone();
    updated.title = "A colder night".to_string();
    updated.status = "private".to_string();
    db.update_story(&updated).await.unwrap();

    let retrieved = db.get_story(&story.id).await.unwrap().unwrap();
    assert_eq!(retrieved.title, "A colder night");
    assert_eq!(retrieved.status, "private");
    // Ownership and creation time are preserved
    assert_eq!(retrieved.user_id, user.id);

    // Delete
    db.delete_story(&story.id).await.unwrap();
    assert!(db.get_story(&story.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_public_listing_excludes_private_and_orders_newest_first() {
    let (db, _temp_dir) = create_test_db().await;

    let user = test_user("google-123");
    db.insert_user(&user).await.unwrap();

    let mut older = test_story(&user.id, "public");
    older.created_at = Utc::now() - Duration::hours(2);
    let newer = test_story(&user.id, "public");
    let private = test_story(&user.id, "private");

    db.insert_story(&older).await.unwrap();
    db.insert_story(&newer).await.unwrap();
    db.insert_story(&private).await.unwrap();

    let listed = db.list_public_stories().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newer.id);
    assert_eq!(listed[1].id, older.id);
    assert!(listed.iter().all(|s| s.status == "public"));
}

#[tokio::test]
async fn test_listing_by_user_scopes_to_owner() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = test_user("google-alice");
    let bob = test_user("google-bob");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();

    db.insert_story(&test_story(&alice.id, "public"))
        .await
        .unwrap();
    db.insert_story(&test_story(&alice.id, "private"))
        .await
        .unwrap();
    db.insert_story(&test_story(&bob.id, "public"))
        .await
        .unwrap();

    let alices = db.list_public_stories_by_user(&alice.id).await.unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].user_id, alice.id);

    // Unknown owner yields an empty list, not an error
    let nobody = db
        .list_public_stories_by_user("01ARZ3NDEKTSV4RRFFQ69G5FAV")
        .await
        .unwrap();
    assert!(nobody.is_empty());
}
