//! Integration tests for the session endpoint.
//!
//! Drives the real router end to end over an in-memory record store:
//! login, session retrieval, and logout, plus the failure matrix.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sessions_api::auth::{
    Argon2Verifier, AuthManager, PasswordVerifier, SessionSettings, SessionSigner,
};
use sessions_api::store::{MemoryStore, RecordStore};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const TEST_SECRET: &str = "test_secret_key_for_testing_only!!";

/// Helper to create a test server over an in-memory store
fn create_test_server() -> (Router, Arc<MemoryStore>) {
    create_test_server_at("/")
}

fn create_test_server_at(base_path: &str) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new().with_unique("User", "username"));

    let auth = AuthManager::new(
        store.clone(),
        Arc::new(Argon2Verifier),
        SessionSigner::new(SessionSettings::new(TEST_SECRET)),
        "User",
    );

    let state = sa_server::api::AppState {
        auth: Arc::new(auth),
    };

    let app = sa_server::api::create_router(state, base_path);

    (app, store)
}

/// Insert a user record directly, the way an external registration would
async fn insert_user(store: &MemoryStore, username: &str, password: &str) -> String {
    let verifier = Argon2Verifier;
    let mut fields = serde_json::Map::new();
    fields.insert("username".to_string(), json!(username));
    fields.insert("password".to_string(), json!(verifier.hash(password).unwrap()));

    store
        .insert("User", fields)
        .await
        .expect("Failed to insert test user")
}

fn login_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request_with_cookie(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("userSession={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Extract the `userSession` cookie value from a response, if any
fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| {
            let pair = raw.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            (name == "userSession").then(|| value.to_string())
        })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Body should be JSON")
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_with_correct_credentials() {
    let (app, store) = create_test_server();
    let user_id = insert_user(&store, "abc", "123987").await;

    let response = app
        .oneshot(login_request(
            "/",
            json!({"username": "abc", "password": "123987"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let token = session_cookie(&response).expect("Login should set the session cookie");
    assert!(!token.is_empty());

    let body = body_json(response).await;
    assert_eq!(body["id"], json!(user_id));
    assert_eq!(body["username"], json!("abc"));
    assert!(
        body.get("password").is_none(),
        "Password hash must never appear in a response body"
    );
}

#[tokio::test]
async fn test_login_with_unknown_username() {
    let (app, store) = create_test_server();
    insert_user(&store, "abc", "123987").await;

    let response = app
        .oneshot(login_request(
            "/",
            json!({"username": "abcdef", "password": "123987"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let (app, store) = create_test_server();
    insert_user(&store, "abc", "123987").await;

    let response = app
        .oneshot(login_request(
            "/",
            json!({"username": "abc", "password": "456"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_wrong_password_indistinguishable_from_unknown_username() {
    let (app, store) = create_test_server();
    insert_user(&store, "abc", "123987").await;

    let unknown = app
        .clone()
        .oneshot(login_request(
            "/",
            json!({"username": "nobody", "password": "123987"}),
        ))
        .await
        .unwrap();
    let wrong = app
        .oneshot(login_request(
            "/",
            json!({"username": "abc", "password": "456"}),
        ))
        .await
        .unwrap();

    assert_eq!(unknown.status(), wrong.status());
    assert_eq!(body_json(unknown).await, body_json(wrong).await);
}

#[tokio::test]
async fn test_login_with_missing_fields() {
    let (app, store) = create_test_server();
    insert_user(&store, "abc", "123987").await;

    for body in [
        json!({"password": "123987"}),
        json!({"username": "abc"}),
        json!({}),
        json!({"username": "", "password": "123987"}),
        json!({"username": "abc", "password": ""}),
    ] {
        let response = app
            .clone()
            .oneshot(login_request("/", body.clone()))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Body {} should be rejected",
            body
        );
        assert!(session_cookie(&response).is_none());
    }
}

// ============================================================================
// Session Retrieval Tests
// ============================================================================

#[tokio::test]
async fn test_get_session_with_valid_cookie() {
    let (app, store) = create_test_server();
    insert_user(&store, "abc", "123987").await;

    let login = app
        .clone()
        .oneshot(login_request(
            "/",
            json!({"username": "abc", "password": "123987"}),
        ))
        .await
        .unwrap();
    let token = session_cookie(&login).unwrap();
    let login_body = body_json(login).await;

    let response = app
        .oneshot(request_with_cookie("GET", "/", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Body equals the projection issued at login
    let body = body_json(response).await;
    assert_eq!(body, login_body);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_get_session_without_cookie() {
    let (app, _) = create_test_server();

    let response = app
        .oneshot(request_with_cookie("GET", "/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_get_session_with_invalid_cookie() {
    let (app, _) = create_test_server();

    let response = app
        .oneshot(request_with_cookie("GET", "/", Some("not-a-valid-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Logout Tests
// ============================================================================

#[tokio::test]
async fn test_logout_clears_session() {
    let (app, store) = create_test_server();
    insert_user(&store, "abc", "123987").await;

    let login = app
        .clone()
        .oneshot(login_request(
            "/",
            json!({"username": "abc", "password": "123987"}),
        ))
        .await
        .unwrap();
    let token = session_cookie(&login).unwrap();

    let response = app
        .clone()
        .oneshot(request_with_cookie("DELETE", "/", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Logout answers with a removal cookie
    let cleared = session_cookie(&response).expect("Logout should clear the session cookie");
    assert!(cleared.is_empty());

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());

    // The cleared cookie no longer authenticates
    let after = app
        .oneshot(request_with_cookie("GET", "/", Some(&cleared)))
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session() {
    let (app, _) = create_test_server();

    let response = app
        .oneshot(request_with_cookie("DELETE", "/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}

// ============================================================================
// Mounting Tests
// ============================================================================

#[tokio::test]
async fn test_sessions_mounted_under_base_path() {
    let (app, store) = create_test_server_at("/sessions");
    insert_user(&store, "abc", "123987").await;

    let response = app
        .clone()
        .oneshot(login_request(
            "/sessions",
            json!({"username": "abc", "password": "123987"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Root no longer serves the session route
    let at_root = app
        .oneshot(login_request(
            "/",
            json!({"username": "abc", "password": "123987"}),
        ))
        .await
        .unwrap();
    assert_eq!(at_root.status(), StatusCode::NOT_FOUND);
}
