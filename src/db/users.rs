use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Inserts a new user; `None` means the login is already taken.
pub async fn create(
    pool: &PgPool,
    login: &str,
    password_hash: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (login, password_hash) VALUES ($1, $2)
         ON CONFLICT (login) DO NOTHING
         RETURNING id, login, password_hash, created_at",
    )
    .bind(login)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, login, password_hash, created_at FROM users WHERE login = $1",
    )
    .bind(login)
    .fetch_optional(pool)
    .await
}
