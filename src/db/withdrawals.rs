use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, sqlx::FromRow)]
pub struct Withdrawal {
    pub order_number: String,
    pub user_id: i64,
    pub sum: i64,
    pub processed_at: DateTime<Utc>,
}

/// Outcome of a withdrawal attempt. Insufficient funds is an expected
/// business result, never a storage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Done,
    InsufficientFunds,
}

/// Debits the balance and appends the withdrawal record in one
/// transaction. Two concurrent attempts against the same balance cannot
/// both pass the guard when their combined sum exceeds it: the guarded
/// UPDATE serializes on the balance row.
pub async fn create(
    pool: &PgPool,
    user_id: i64,
    order_number: &str,
    sum_minor: i64,
) -> Result<WithdrawOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    if !super::balance::debit(&mut *tx, user_id, sum_minor).await? {
        tx.rollback().await?;
        return Ok(WithdrawOutcome::InsufficientFunds);
    }

    sqlx::query("INSERT INTO withdrawals (order_number, user_id, sum) VALUES ($1, $2, $3)")
        .bind(order_number)
        .bind(user_id)
        .bind(sum_minor)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(WithdrawOutcome::Done)
}

pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Withdrawal>, sqlx::Error> {
    sqlx::query_as::<_, Withdrawal>(
        "SELECT order_number, user_id, sum, processed_at
         FROM withdrawals
         WHERE user_id = $1
         ORDER BY processed_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
