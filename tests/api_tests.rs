mod common;

use adoption_portal::{AppConfig, AppState, auth::Role, create_router, error::ErrorBody};
use common::MockRepoControl;
use std::sync::Arc;

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

/// Binds the full router (middleware stack included) to an ephemeral port and
/// returns the base url.
async fn spawn_app(repo: MockRepoControl) -> String {
    let config = AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    let state = AppState {
        repo: Arc::new(repo),
        config,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn health_check_works() {
    let url = spawn_app(MockRepoControl::default()).await;

    let response = reqwest::get(format!("{}/health", url)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn register_user_returns_created_with_token() {
    let url = spawn_app(MockRepoControl::default()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/users", url))
        .json(&serde_json::json!({
            "email": "new@example.com",
            "username": "newbie",
            "password": "hunter2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["id"], 1);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn authenticated_get_user_never_leaks_hash() {
    let url = spawn_app(MockRepoControl {
        user: Some(common::sample_user(1)),
        ..MockRepoControl::default()
    })
    .await;

    let token = common::make_token(TEST_JWT_SECRET, 1, Role::User, 3600);
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/users/1", url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Raw-text assertion so a renamed field cannot hide the leak.
    let text = response.text().await.unwrap();
    assert!(text.contains("\"email\""));
    assert!(!text.contains("hashedPassword"));
    assert!(!text.contains("hashed_password"));
    assert!(!text.contains("argon2id"));
}

#[tokio::test]
async fn missing_token_is_unauthorized_with_error_body() {
    let url = spawn_app(MockRepoControl {
        user: Some(common::sample_user(1)),
        ..MockRepoControl::default()
    })
    .await;

    let response = reqwest::get(format!("{}/users/1", url)).await.unwrap();
    assert_eq!(response.status(), 401);

    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.title, "Unauthorized.");
    assert!(!body.errors.is_empty());
}

#[tokio::test]
async fn shelter_token_rejected_on_user_route() {
    // The principal exists in the shelter table; the route requires user role.
    let url = spawn_app(MockRepoControl {
        user: Some(common::sample_user(1)),
        shelter_user: Some(common::sample_shelter_user(1)),
        ..MockRepoControl::default()
    })
    .await;

    let token = common::make_token(TEST_JWT_SECRET, 1, Role::Shelter, 3600);
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/users/1", url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn pet_not_found_has_structured_body() {
    let url = spawn_app(MockRepoControl::default()).await;

    let response = reqwest::get(format!("{}/pets/99", url)).await.unwrap();
    assert_eq!(response.status(), 404);

    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.title, "Pet not found.");
    assert_eq!(
        body.errors,
        vec!["Pet with id of 99 could not be found.".to_string()]
    );
}

#[tokio::test]
async fn duplicate_email_registration_is_bad_request() {
    let url = spawn_app(MockRepoControl {
        write_failure: Some(adoption_portal::error::ApiError::validation(vec![
            "Email or username is already in use.".to_string(),
        ])),
        ..MockRepoControl::default()
    })
    .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/shelter-users", url))
        .json(&serde_json::json!({
            "email": "taken@example.com",
            "username": "taken",
            "password": "hunter2",
            "shelterName": "Paws for a Cause",
            "phoneNum": "5551234567",
            "address": "1 Shelter Way",
            "city": "Austin",
            "stateId": 43,
            "zipCode": "78701"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.title, "Bad request.");
    assert_eq!(
        body.errors,
        vec!["Email or username is already in use.".to_string()]
    );
}

#[tokio::test]
async fn public_pet_listing_needs_no_token() {
    let url = spawn_app(MockRepoControl {
        pets: vec![common::sample_pet(3, 42)],
        ..MockRepoControl::default()
    })
    .await;

    let response = reqwest::get(format!("{}/pets?species=dog", url)).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["pets"].as_array().map(|p| p.len()), Some(1));
    assert_eq!(body["pets"][0]["name"], "Shana");
}

#[tokio::test]
async fn login_with_bad_credentials_is_unauthorized() {
    let url = spawn_app(MockRepoControl::default()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/users/token", url))
        .json(&serde_json::json!({
            "email": "ghost@example.com",
            "password": "whatever"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.title, "Login failed");
}
