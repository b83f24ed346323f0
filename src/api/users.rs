//! Registration and login endpoints

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use super::require_json;

use crate::auth::{create_token, hash_password, verify_password};
use crate::db;
use crate::error::{ApiError, ServiceError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub id: i64,
    pub login: String,
    pub token: String,
}

/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let req = require_json(payload)?;
    if req.login.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest.into());
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("password hashing failed: {e}");
        ApiError::Internal
    })?;

    let user = db::users::create(&state.pool, &req.login, &password_hash)
        .await?
        .ok_or(ApiError::LoginTaken)?;

    let token = issue_token(&state, user.id, &user.login)?;
    Ok(authorized_response(
        AuthResponse {
            id: user.id,
            login: user.login.clone(),
            token: token.clone(),
        },
        &token,
    )?)
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let req = require_json(payload)?;
    if req.login.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest.into());
    }

    let user = db::users::find_by_login(&state.pool, &req.login)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials.into());
    }

    let token = issue_token(&state, user.id, &user.login)?;
    Ok(authorized_response(
        AuthResponse {
            id: user.id,
            login: user.login.clone(),
            token: token.clone(),
        },
        &token,
    )?)
}

fn issue_token(state: &AppState, user_id: i64, login: &str) -> Result<String, ApiError> {
    create_token(user_id, login, &state.jwt_secret, state.token_exp_hours).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        ApiError::Internal
    })
}

/// 200 response carrying the bearer token both in the body and in the
/// Authorization header.
fn authorized_response(body: AuthResponse, token: &str) -> Result<Response, ApiError> {
    let header_value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ApiError::Internal)?;
    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(header::AUTHORIZATION, header_value);
    Ok(response)
}
