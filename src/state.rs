//! Application state for loyalty-server

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::Config;
use crate::reconcile::JobQueue;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state, constructed once at startup and handed by
/// reference to every handler and the worker. No package-level globals.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Bearer token lifetime in hours
    pub token_exp_hours: i64,
    /// Producer handle of the reconciliation queue
    pub jobs: Arc<dyn JobQueue>,
}

impl AppState {
    pub async fn new(config: &Config, jobs: Arc<dyn JobQueue>) -> Result<Self, BoxError> {
        let pool = connect_with_retry(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            token_exp_hours: config.token_exp_hours,
            jobs,
        })
    }
}

/// Postgres may come up after us; retry with fixed backoff steps before
/// giving up.
async fn connect_with_retry(database_url: &str) -> Result<PgPool, BoxError> {
    let backoff_secs = [1u64, 3, 5];
    let mut attempt = 0;

    loop {
        match PgPool::connect(database_url).await {
            Ok(pool) => {
                tracing::info!("connected to Postgres");
                return Ok(pool);
            }
            Err(_) if attempt < backoff_secs.len() => {
                tracing::info!(
                    "Postgres not yet ready, backing off for {}s...",
                    backoff_secs[attempt]
                );
                tokio::time::sleep(Duration::from_secs(backoff_secs[attempt])).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!("giving up connecting to Postgres: {e}");
                return Err(e.into());
            }
        }
    }
}
