// tests/dashboard_tests.rs

use blogboard::{config::Config, db::Db, error::AppError, models::user::NewUser, routes, state::AppState};
use tempfile::TempDir;

/// Spawns the app on a random port against a fresh SQLite file.
/// Returns the base URL, the gateway handle and the tempdir guard that
/// keeps the database file alive for the duration of the test.
async fn spawn_app() -> (String, Db, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create tempdir");
    let database_url = format!("sqlite://{}/blog.db", dir.path().display());

    let db = Db::connect(&database_url)
        .await
        .expect("Failed to open test database");

    let config = Config {
        database_url,
        port: 0,
        rust_log: "error".to_string(),
    };

    let state = AppState {
        db: db.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, db, dir)
}

fn unique_email() -> String {
    format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

#[tokio::test]
async fn create_user_works() {
    let (address, _db, _guard) = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();

    let response = client
        .post(format!("{}/api/users", address))
        .json(&serde_json::json!({
            "name": "Ada",
            "email": email,
            "password": "password123",
            "is_admin": false
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], email);
    assert_eq!(body["is_admin"], false);
    // The stored hash must never leave the process.
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn create_user_fails_validation() {
    let (address, _db, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/users", address))
        .json(&serde_json::json!({
            "name": "Ada",
            "email": "not-an-email",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_email_conflicts_and_leaves_count_unchanged() {
    let (address, _db, _guard) = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();

    let payload = serde_json::json!({
        "name": "Ada",
        "email": email,
        "password": "password123"
    });

    let first = client
        .post(format!("{}/api/users", address))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{}/api/users", address))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);

    let error: serde_json::Value = second.json().await.unwrap();
    assert!(error["error"].as_str().unwrap().contains(&email));

    let users: Vec<serde_json::Value> = client
        .get(format!("{}/api/users", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn list_users_newest_first() {
    let (address, _db, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    for name in ["First", "Second"] {
        let response = client
            .post(format!("{}/api/users", address))
            .json(&serde_json::json!({
                "name": name,
                "email": unique_email(),
                "password": "password123"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let users: Vec<serde_json::Value> = client
        .get(format!("{}/api/users", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], "Second");
    assert_eq!(users[1]["name"], "First");
}

#[tokio::test]
async fn delete_user_removes_exactly_one() {
    let (address, _db, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for name in ["Keep", "Drop"] {
        let body: serde_json::Value = client
            .post(format!("{}/api/users", address))
            .json(&serde_json::json!({
                "name": name,
                "email": unique_email(),
                "password": "password123"
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(body["id"].as_i64().unwrap());
    }

    let response = client
        .delete(format!("{}/api/users/{}", address, ids[1]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let users: Vec<serde_json::Value> = client
        .get(format!("{}/api/users", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], "Keep");
}

#[tokio::test]
async fn delete_missing_user_is_not_found() {
    let (address, _db, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .delete(format!("{}/api/users/424242", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let users: Vec<serde_json::Value> = client
        .get(format!("{}/api/users", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn created_user_stores_a_hash_not_the_password() {
    let (_address, db, _guard) = spawn_app().await;

    let new_user = NewUser::create("Ada", "ada@x.com", "secret", false).unwrap();
    db.create_user(&new_user).await.unwrap();

    let users = db.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Ada");
    assert_eq!(users[0].email, "ada@x.com");
    assert!(!users[0].password_hash.is_empty());
    assert_ne!(users[0].password_hash, "secret");

    assert!(users[0].check_password("secret").unwrap());
    assert!(!users[0].check_password("guess").unwrap());
}

#[tokio::test]
async fn deleting_a_user_cascades_to_their_posts() {
    let (_address, db, _guard) = spawn_app().await;

    let new_user = NewUser::create("Ada", "ada@x.com", "secret", false).unwrap();
    let user = db.create_user(&new_user).await.unwrap();

    let post = db
        .create_post(&blogboard::models::post::NewPost::create(
            "Hello", user.id, "World", true,
        ))
        .await
        .unwrap();

    db.delete_user(user.id).await.unwrap();

    let err = db.get_post(post.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
