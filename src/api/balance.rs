//! Balance endpoint

use axum::Json;
use axum::extract::{Extension, State};
use serde::Serialize;

use super::ApiResult;
use crate::auth::AuthUser;
use crate::db;
use crate::money::Money;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BalanceResponse {
    pub current: Money,
    pub withdrawn: Money,
}

/// GET /api/user/balance
pub async fn read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<BalanceResponse> {
    let balance = db::balance::read(&state.pool, user.user_id).await?;
    Ok(Json(BalanceResponse {
        current: Money::from_minor(balance.current),
        withdrawn: Money::from_minor(balance.withdrawn),
    }))
}
