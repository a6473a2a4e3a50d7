// tests/api_tests.rs

use std::sync::Arc;

use stock_quiz::{
    catalog::Catalog, config::Config, db::MemoryStore, routes, state::AppState,
};

/// Spawns the app on a random port with an in-memory store.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let config = Config {
        database_url: "memory".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        port: 0,
        frontend_url: "http://localhost:5173".to_string(),
        quiz_seed: Some(42),
    };

    let catalog = Catalog::embedded().expect("Embedded catalog must load");
    let state = AppState::new(Arc::new(MemoryStore::new()), catalog, config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn signup(client: &reqwest::Client, address: &str, username: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn signup_returns_user_and_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = signup(&client, &address, "trader_joe").await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["username"], "trader_joe");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"]["createdAt"].is_string());
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn signup_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Username too short
    let response = signup(&client, &address, "yo").await;
    assert_eq!(response.status().as_u16(), 400);

    // Password too short
    let response = client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({ "username": "valid_name", "password": "12345" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Malformed body
    let response = client
        .post(format!("{}/api/auth/signup", address))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    assert_eq!(signup(&client, &address, "dup_user").await.status().as_u16(), 201);
    let response = signup(&client, &address, "dup_user").await;

    assert_eq!(response.status().as_u16(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn login_and_me_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    signup(&client, &address, "login_user").await;

    // Wrong password
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": "login_user", "password": "nope-nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // Unknown user gets the same answer
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": "ghost", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": "login_user", "password": "password123" }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");
    let token = login["token"].as_str().expect("Token not found");

    let me = client
        .get(format!("{}/api/auth/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(me.status().as_u16(), 200);
    let me: serde_json::Value = me.json().await.unwrap();
    assert_eq!(me["username"], "login_user");
    assert_eq!(me["id"], login["user"]["id"]);
}

#[tokio::test]
async fn me_requires_valid_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/auth/me", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .get(format!("{}/api/auth/me", address))
        .header("Authorization", "Bearer not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn long_passphrase_signs_up_and_logs_in() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let passphrase = "correct horse battery staple ".repeat(10);

    let response = client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({ "username": "passphrase_user", "password": passphrase }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": "passphrase_user", "password": passphrase }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Login only requires non-empty fields
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": "passphrase_user", "password": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
