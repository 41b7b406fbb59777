// tests/http_api_test.rs
// Router-level tests: auth surface, bearer enforcement, goals CRUD.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{MockLlm, test_state};
use coach_backend::api::http::http_router;

fn app(state: std::sync::Arc<coach_backend::state::AppState>) -> Router {
    Router::new().nest("/api", http_router(state))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            None,
            json!({ "email": email, "password": "correct-horse-battery" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_round_trip() {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let app = app(state);

    let token = register(&app, "sarah@example.com").await;
    assert!(!token.is_empty());

    // Duplicate registration rejected
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            None,
            json!({ "email": "sarah@example.com", "password": "correct-horse-battery" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Login with the right password
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "email": "sarah@example.com", "password": "correct-horse-battery" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password is a 401
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "email": "sarah@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_bearer() {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let app = app(state);

    for uri in ["/api/memories", "/api/goals", "/api/chats", "/api/user/status"] {
        let response = app.clone().oneshot(get_req(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
    }

    let response = app
        .clone()
        .oneshot(get_req("/api/memories", Some("not-a-real-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn goals_crud_over_http() {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let app = app(state);
    let token = register(&app, "goals@example.com").await;

    // Empty description rejected
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/goals",
            Some(&token),
            json!({ "title": "Run", "description": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/goals",
            Some(&token),
            json!({ "title": "Run a marathon", "description": "Finish under 4 hours" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let goal = body_json(response).await;
    assert_eq!(goal["status"], "active");
    let goal_id = goal["id"].as_str().unwrap().to_string();

    // Toggle status
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/goals/{goal_id}/status"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(json!({ "status": "completed" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "completed");

    // Invalid status rejected
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/goals/{goal_id}/status"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(json!({ "status": "abandoned" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Delete, then the list is empty
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/goals/{goal_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_req("/api/goals", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["goals"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn user_status_reports_interview_flag_and_profile() {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let app = app(state);
    let token = register(&app, "status@example.com").await;

    let response = app
        .clone()
        .oneshot(get_req("/api/user/status", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["initial_call_completed"], false);
    assert!(body["profile"]["first_name"].is_null());
}

#[tokio::test]
async fn chat_stream_rejects_unknown_chat_before_streaming() {
    let state = test_state(MockLlm::new(&["hello there"])).await;
    let app = app(state);
    let token = register(&app, "stream404@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat/stream",
            Some(&token),
            json!({ "message": "hi", "chat_id": "nonexistent" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat/stream",
            Some(&token),
            json!({ "message": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
