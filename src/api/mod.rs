//! API routes for loyalty-server

pub mod balance;
pub mod health;
pub mod orders;
pub mod users;
pub mod withdrawals;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::error::{ApiError, ServiceError};
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, ServiceError>;

/// A body that fails JSON extraction (missing content type, malformed
/// JSON, wrong field types) is a plain 400, never a 415/422.
pub(crate) fn require_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected malformed request body");
            Err(ApiError::BadRequest)
        }
    }
}

/// Create the combined router
pub fn router(state: AppState) -> Router {
    // Registration and login (no auth)
    let public = Router::new()
        .route("/api/user/register", post(users::register))
        .route("/api/user/login", post(users::login));

    // Everything else requires a bearer token
    let protected = Router::new()
        .route(
            "/api/user/orders",
            post(orders::create).get(orders::list),
        )
        .route("/api/user/balance", get(balance::read))
        .route("/api/user/balance/withdraw", post(withdrawals::withdraw))
        .route("/api/user/withdrawals", get(withdrawals::list))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
