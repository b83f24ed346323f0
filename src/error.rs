//! Unified service-layer error handling.
//!
//! `ApiError` enumerates the client-visible outcomes with their HTTP status
//! codes. `ServiceError` bridges storage-layer errors (`sqlx::Error`,
//! `BoxError`) and `ApiError` so handlers can use `?` without per-call
//! `.map_err(|e| { tracing::error!(...); ... })` boilerplate: database
//! failures are logged once here and surfaced as a plain 500.

use axum::Json;
use axum::response::IntoResponse;
use http::StatusCode;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Client-visible error outcomes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("invalid request")]
    BadRequest,
    #[error("authentication required")]
    Unauthorized,
    #[error("invalid login/password pair")]
    InvalidCredentials,
    #[error("login is already taken")]
    LoginTaken,
    #[error("order number uploaded by another user")]
    OrderConflict,
    #[error("invalid order number")]
    InvalidOrderNumber,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::LoginTaken => StatusCode::CONFLICT,
            ApiError::OrderConflict => StatusCode::CONFLICT,
            ApiError::InvalidOrderNumber => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Service-layer error with only two variants.
///
/// - `Db`: storage/infrastructure errors (auto-logged, mapped to 500)
/// - `Api`: business outcomes that already carry the right status code
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    Api(ApiError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<ApiError> for ServiceError {
    fn from(e: ApiError) -> Self {
        ServiceError::Api(e)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Api(api) => api,
            ServiceError::Db(db) => {
                tracing::error!(error = %db, "service database error");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let api: ApiError = self.into();
        api.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
