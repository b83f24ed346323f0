//! Request-body validation at the HTTP boundary.
//!
//! A body that fails JSON extraction must come back as 400, not as the
//! extractor's native 415/422. These run against the real router; the
//! lazy pool never connects because every request is rejected before any
//! query runs.

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode, header};
use tower::ServiceExt;

use loyalty_server::api;
use loyalty_server::auth::create_token;
use loyalty_server::reconcile::ChannelQueue;
use loyalty_server::state::AppState;

const JWT_SECRET: &str = "test-secret";

fn test_state() -> AppState {
    let pool =
        sqlx::PgPool::connect_lazy("postgres://localhost/unused").expect("lazy pool handle");
    let (queue, _rx) = ChannelQueue::bounded(4);
    AppState {
        pool,
        jwt_secret: JWT_SECRET.into(),
        token_exp_hours: 2,
        jobs: Arc::new(queue),
    }
}

async fn send(request: Request<Body>) -> StatusCode {
    api::router(test_state())
        .oneshot(request)
        .await
        .expect("router is infallible")
        .status()
}

#[tokio::test]
async fn register_without_content_type_is_a_bad_request() {
    let request = Request::post("/api/user/register")
        .body(Body::from(r#"{"login":"maria","password":"pass"}"#))
        .expect("request");
    assert_eq!(send(request).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_malformed_json_is_a_bad_request() {
    let request = Request::post("/api/user/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"login":"#))
        .expect("request");
    assert_eq!(send(request).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_wrong_field_types_is_a_bad_request() {
    let request = Request::post("/api/user/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"login":1,"password":2}"#))
        .expect("request");
    assert_eq!(send(request).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn withdraw_with_malformed_body_is_a_bad_request() {
    let token = create_token(1, "maria", JWT_SECRET, 2).expect("token");
    let request = Request::post("/api/user/balance/withdraw")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .expect("request");
    assert_eq!(send(request).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn withdraw_without_a_token_is_unauthorized() {
    let request = Request::post("/api/user/balance/withdraw")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"order":"12345678903","sum":10}"#))
        .expect("request");
    assert_eq!(send(request).await, StatusCode::UNAUTHORIZED);
}
