//! Order submission and listing endpoints

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::db;
use crate::db::orders::{CreateOutcome, OrderStatus};
use crate::error::{ApiError, ServiceError};
use crate::luhn;
use crate::money::Money;
use crate::reconcile::ReconcileJob;
use crate::state::AppState;

/// POST /api/user/orders
///
/// Body is the plain order number. Accepting a number already uploaded by
/// the same user is an idempotent 200; another user's number is a 409.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: String,
) -> Result<Response, ServiceError> {
    let number = body.trim();
    if number.is_empty() {
        return Err(ApiError::BadRequest.into());
    }
    if !luhn::is_valid(number) {
        return Err(ApiError::InvalidOrderNumber.into());
    }

    match db::orders::create(&state.pool, number, user.user_id).await? {
        CreateOutcome::OwnedByOther => Err(ApiError::OrderConflict.into()),
        CreateOutcome::AlreadyOwned => Ok(StatusCode::OK.into_response()),
        CreateOutcome::Created => {
            // May briefly await here when the queue is full; backpressure
            // surfaces as request latency, never as a lost job.
            state
                .jobs
                .enqueue(ReconcileJob {
                    order_number: number.to_string(),
                    user_id: user.user_id,
                })
                .await
                .map_err(|e| {
                    tracing::error!(order = %number, error = %e, "failed to enqueue job");
                    ApiError::Internal
                })?;

            Ok(StatusCode::ACCEPTED.into_response())
        }
    }
}

#[derive(Serialize)]
pub struct OrderItem {
    pub number: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Money::is_zero")]
    pub accrual: Money,
    pub created_at: DateTime<Utc>,
}

/// GET /api/user/orders
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ServiceError> {
    let rows = db::orders::list_for_user(&state.pool, user.user_id).await?;

    if rows.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let status = OrderStatus::from_db(&row.status).ok_or_else(|| {
            tracing::error!(order = %row.number, status = %row.status, "unknown order status in store");
            ApiError::Internal
        })?;
        items.push(OrderItem {
            number: row.number,
            status,
            accrual: Money::from_minor(row.accrual),
            created_at: row.created_at,
        });
    }

    Ok(Json(items).into_response())
}
