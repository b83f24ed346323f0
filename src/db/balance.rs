use sqlx::{PgExecutor, PgPool};

#[derive(Debug, Default, Clone, Copy, sqlx::FromRow)]
pub struct Balance {
    pub current: i64,
    pub withdrawn: i64,
}

/// A user with no activity has a valid zero balance, not a missing one.
pub async fn read(pool: &PgPool, user_id: i64) -> Result<Balance, sqlx::Error> {
    let row = sqlx::query_as::<_, Balance>(
        "SELECT current, withdrawn FROM balance WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.unwrap_or_default())
}

/// Unconditional additive credit; creates the balance row on first touch.
/// Runs on any executor so the worker can issue it inside its transaction.
pub async fn credit(
    executor: impl PgExecutor<'_>,
    user_id: i64,
    amount_minor: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO balance (user_id, current, withdrawn) VALUES ($1, $2, 0)
         ON CONFLICT (user_id) DO UPDATE
         SET current = balance.current + EXCLUDED.current, updated_at = NOW()",
    )
    .bind(user_id)
    .bind(amount_minor)
    .execute(executor)
    .await?;
    Ok(())
}

/// Guarded debit: subtracts from `current` and adds to `withdrawn` in one
/// statement, only when `current >= amount` at the moment of the update.
/// Returns false when the guard fails (insufficient funds), including
/// when no balance row exists yet.
pub async fn debit(
    executor: impl PgExecutor<'_>,
    user_id: i64,
    amount_minor: i64,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE balance
         SET current = current - $2, withdrawn = withdrawn + $2, updated_at = NOW()
         WHERE user_id = $1 AND current >= $2",
    )
    .bind(user_id)
    .bind(amount_minor)
    .execute(executor)
    .await?;
    Ok(updated.rows_affected() == 1)
}
