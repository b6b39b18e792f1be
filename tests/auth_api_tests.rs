use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sustainx::{routes::create_router, test_utils::test_helpers};
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn setup() -> (Router, SqlitePool) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let state = test_helpers::create_test_state(pool.clone());
    (create_router(state), pool)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_me(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/auth/me");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn token_from_link(link: &str) -> String {
    link.split("token=")
        .nth(1)
        .expect("magic link carries a token")
        .to_string()
}

#[tokio::test]
async fn test_full_sign_in_flow() {
    let (app, _pool) = setup().await;

    let (status, body) = send(&app, post_json("/auth/magic-link", json!({"email": "a@b.com"}))).await;
    assert_eq!(status, StatusCode::OK);
    let link = body["magic_link"].as_str().unwrap();
    assert!(link.starts_with("http://localhost:3000/verify?token="));

    let token = token_from_link(link);
    let (status, body) = send(&app, post_json("/auth/verify", json!({"token": token}))).await;
    assert_eq!(status, StatusCode::OK);
    let credential = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["email"], "a@b.com");

    let (status, body) = send(&app, get_me(Some(format!("Bearer {}", credential).as_str()))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].is_i64());
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["is_active"], true);
}

#[tokio::test]
async fn test_magic_link_rejects_invalid_email() {
    let (app, _pool) = setup().await;

    let (status, body) = send(
        &app,
        post_json("/auth/magic-link", json!({"email": "not-an-email"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Please enter a valid email address");
}

#[tokio::test]
async fn test_magic_link_rejects_missing_email() {
    let (app, _pool) = setup().await;

    let (status, _) = send(&app, post_json("/auth/magic-link", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_missing_token_is_bad_request() {
    let (app, _pool) = setup().await;

    let (status, body) = send(&app, post_json("/auth/verify", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Token missing");

    let (status, _) = send(&app, post_json("/auth/verify", json!({"token": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_unknown_token_is_unauthorized_and_creates_no_user() {
    let (app, pool) = setup().await;

    let (status, body) = send(
        &app,
        post_json("/auth/verify", json!({"token": "does-not-exist"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid or expired token");
    assert_eq!(test_helpers::count_users(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_verify_reused_token_matches_unknown_token_response() {
    let (app, _pool) = setup().await;

    let (_, body) = send(&app, post_json("/auth/magic-link", json!({"email": "a@b.com"}))).await;
    let token = token_from_link(body["magic_link"].as_str().unwrap());

    let (status, _) = send(&app, post_json("/auth/verify", json!({"token": token}))).await;
    assert_eq!(status, StatusCode::OK);

    let reused = send(&app, post_json("/auth/verify", json!({"token": token}))).await;
    let unknown = send(&app, post_json("/auth/verify", json!({"token": "nope"}))).await;

    assert_eq!(reused.0, StatusCode::UNAUTHORIZED);
    assert_eq!(reused, unknown);
}

#[tokio::test]
async fn test_me_rejects_missing_and_malformed_credentials() {
    let (app, _pool) = setup().await;

    let cases = [
        None,
        Some("Bearer"),
        Some("Basic dXNlcjpwYXNz"),
        Some("Bearer not.a.jwt"),
        Some("Bearer garbage"),
    ];

    let mut bodies = Vec::new();
    for authorization in cases {
        let (status, body) = send(&app, get_me(authorization)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "case {:?}", authorization);
        bodies.push(body);
    }

    bodies.dedup();
    assert_eq!(bodies.len(), 1, "401 bodies must not reveal the failure reason");
}

#[tokio::test]
async fn test_me_rejects_credential_for_deleted_user() {
    let (app, pool) = setup().await;

    let (_, body) = send(&app, post_json("/auth/magic-link", json!({"email": "gone@b.com"}))).await;
    let token = token_from_link(body["magic_link"].as_str().unwrap());
    let (_, body) = send(&app, post_json("/auth/verify", json!({"token": token}))).await;
    let credential = body["token"].as_str().unwrap().to_string();

    sqlx::query("DELETE FROM users WHERE email = ?")
        .bind("gone@b.com")
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = send(&app, get_me(Some(format!("Bearer {}", credential).as_str()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reports_listing_is_empty() {
    let (app, _pool) = setup().await;

    for uri in ["/reports/", "/reports"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}

#[tokio::test]
async fn test_root_status_and_security_headers() {
    let (app, _pool) = setup().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().get("strict-transport-security").is_none());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "Backend running");
}

#[tokio::test]
async fn test_cors_preflight_allows_authorization_header() {
    let (app, _pool) = setup().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/auth/me")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
