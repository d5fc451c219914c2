mod common;

use adoption_portal::{
    AppConfig,
    auth::{AuthUser, Role},
    config::Env,
};
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use common::MockRepoControl;

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn prod_config() -> AppConfig {
    AppConfig {
        env: Env::Production,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

/// Helper to get the mutable Parts struct from a generated Request.
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

// --- Tests ---

#[tokio::test]
async fn valid_user_token_resolves_user_principal() {
    let token = common::make_token(TEST_JWT_SECRET, 1, Role::User, 3600);

    let repo = MockRepoControl {
        user: Some(common::sample_user(1)),
        ..MockRepoControl::default()
    };
    let state = common::test_state_with_config(repo, prod_config());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, 1);
    assert_eq!(auth_user.role, Role::User);
}

#[tokio::test]
async fn valid_shelter_token_resolves_shelter_principal() {
    let token = common::make_token(TEST_JWT_SECRET, 2, Role::Shelter, 3600);

    let repo = MockRepoControl {
        shelter_user: Some(common::sample_shelter_user(2)),
        ..MockRepoControl::default()
    };
    let state = common::test_state_with_config(repo, prod_config());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, 2);
    assert_eq!(auth_user.role, Role::Shelter);
}

#[tokio::test]
async fn missing_header_is_rejected() {
    let state = common::test_state_with_config(MockRepoControl::default(), prod_config());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let token = common::make_token(TEST_JWT_SECRET, 1, Role::User, -3600);

    let repo = MockRepoControl {
        user: Some(common::sample_user(1)),
        ..MockRepoControl::default()
    };
    let state = common::test_state_with_config(repo, prod_config());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    // Signed with a different secret than the server's.
    let token = common::make_token("attacker-controlled-secret", 1, Role::User, 3600);

    let repo = MockRepoControl {
        user: Some(common::sample_user(1)),
        ..MockRepoControl::default()
    };
    let state = common::test_state_with_config(repo, prod_config());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_deleted_account_is_rejected() {
    // Cryptographically valid token, but the repository no longer has the row.
    let token = common::make_token(TEST_JWT_SECRET, 1, Role::User, 3600);
    let state = common::test_state_with_config(MockRepoControl::default(), prod_config());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn shelter_token_does_not_resolve_against_user_table() {
    // The role claim decides which table is consulted. A shelter-role token
    // whose subject only exists in the users table must fail the lookup.
    let token = common::make_token(TEST_JWT_SECRET, 1, Role::Shelter, 3600);

    let repo = MockRepoControl {
        user: Some(common::sample_user(1)),
        shelter_user: None,
        ..MockRepoControl::default()
    };
    let state = common::test_state_with_config(repo, prod_config());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn local_bypass_resolves_existing_account() {
    let repo = MockRepoControl {
        shelter_user: Some(common::sample_shelter_user(9)),
        ..MockRepoControl::default()
    };
    // Default config is Env::Local.
    let state = common::test_state(repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_static("9"),
    );
    parts.headers.insert(
        header::HeaderName::from_static("x-user-role"),
        header::HeaderValue::from_static("shelter"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, 9);
    assert_eq!(auth_user.role, Role::Shelter);
}

#[tokio::test]
async fn local_bypass_disabled_in_production() {
    let repo = MockRepoControl {
        user: Some(common::sample_user(9)),
        ..MockRepoControl::default()
    };
    let state = common::test_state_with_config(repo, prod_config());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_static("9"),
    );
    parts.headers.insert(
        header::HeaderName::from_static("x-user-role"),
        header::HeaderValue::from_static("user"),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}
