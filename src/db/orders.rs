use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// Internal order lifecycle.
///
/// `New` and `Processing` await another reconciliation round; `Invalid`
/// and `Processed` are terminal; no transition ever leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Invalid => "INVALID",
            OrderStatus::Processed => "PROCESSED",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "NEW" => Some(OrderStatus::New),
            "PROCESSING" => Some(OrderStatus::Processing),
            "INVALID" => Some(OrderStatus::Invalid),
            "PROCESSED" => Some(OrderStatus::Processed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Invalid | OrderStatus::Processed)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct Order {
    pub number: String,
    pub user_id: i64,
    pub status: String,
    pub accrual: i64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of an order submission against the unique number constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// New order stored with status NEW
    Created,
    /// Same number already uploaded by the same user (idempotent success)
    AlreadyOwned,
    /// Same number already uploaded by a different user
    OwnedByOther,
}

pub async fn create(
    pool: &PgPool,
    number: &str,
    user_id: i64,
) -> Result<CreateOutcome, sqlx::Error> {
    let inserted = sqlx::query(
        "INSERT INTO orders (number, user_id, status) VALUES ($1, $2, 'NEW')
         ON CONFLICT (number) DO NOTHING",
    )
    .bind(number)
    .bind(user_id)
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 1 {
        return Ok(CreateOutcome::Created);
    }

    let (owner,): (i64,) = sqlx::query_as("SELECT user_id FROM orders WHERE number = $1")
        .bind(number)
        .fetch_one(pool)
        .await?;

    Ok(if owner == user_id {
        CreateOutcome::AlreadyOwned
    } else {
        CreateOutcome::OwnedByOther
    })
}

pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "SELECT number, user_id, status, accrual, created_at
         FROM orders
         WHERE user_id = $1
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Applies an accrual verdict in one transaction: the order's status and
/// accrual amount change together with the balance credit, or not at all.
///
/// The order row is updated only while still non-terminal; returns false
/// (and credits nothing) when the order was already INVALID or PROCESSED,
/// so a redelivered verdict can never credit twice.
pub async fn apply_accrual(
    pool: &PgPool,
    number: &str,
    user_id: i64,
    status: OrderStatus,
    accrual_minor: i64,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE orders SET status = $2, accrual = $3, updated_at = NOW()
         WHERE number = $1 AND status IN ('NEW', 'PROCESSING')",
    )
    .bind(number)
    .bind(status.as_str())
    .bind(accrual_minor)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    if accrual_minor > 0 {
        super::balance::credit(&mut *tx, user_id, accrual_minor).await?;
    }

    tx.commit().await?;
    Ok(true)
}
