//! Withdrawal endpoints

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db;
use crate::db::withdrawals::WithdrawOutcome;
use crate::error::{ApiError, ServiceError};
use crate::luhn;
use crate::money::Money;
use crate::state::AppState;

use super::require_json;

#[derive(Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: Money,
}

/// POST /api/user/balance/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let req = require_json(payload)?;
    if !luhn::is_valid(&req.order) {
        return Err(ApiError::InvalidOrderNumber.into());
    }
    if !req.sum.is_positive() {
        return Err(ApiError::BadRequest.into());
    }

    match db::withdrawals::create(&state.pool, user.user_id, &req.order, req.sum.minor()).await? {
        WithdrawOutcome::InsufficientFunds => Err(ApiError::InsufficientFunds.into()),
        WithdrawOutcome::Done => Ok(StatusCode::OK.into_response()),
    }
}

#[derive(Serialize)]
pub struct WithdrawalItem {
    #[serde(rename = "order")]
    pub order_number: String,
    pub sum: Money,
    pub processed_at: DateTime<Utc>,
}

/// GET /api/user/withdrawals
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ServiceError> {
    let rows = db::withdrawals::list_for_user(&state.pool, user.user_id).await?;

    if rows.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items: Vec<WithdrawalItem> = rows
        .into_iter()
        .map(|row| WithdrawalItem {
            order_number: row.order_number,
            sum: Money::from_minor(row.sum),
            processed_at: row.processed_at,
        })
        .collect();

    Ok(Json(items).into_response())
}
