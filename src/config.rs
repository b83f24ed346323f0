//! Service configuration loaded from environment variables.

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Loyalty server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address, e.g. `0.0.0.0:8080`
    pub run_address: String,
    /// Storage driver name; only Postgres is supported
    pub store_driver: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Bearer token lifetime in hours
    pub token_exp_hours: i64,
    /// Base URL of the external accrual service
    pub accrual_address: String,
    /// Seconds to wait before each accrual poll
    pub accrual_poll_interval_secs: u64,
    /// Reconciliation queue capacity
    pub queue_capacity: usize,
    /// Environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let store_driver = std::env::var("STORE_DRIVER").unwrap_or_else(|_| "postgresql".into());
        if !matches!(store_driver.as_str(), "postgresql" | "postgres") {
            return Err(format!("unknown store driver: {store_driver}").into());
        }

        Ok(Self {
            run_address: std::env::var("RUN_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            store_driver,
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            token_exp_hours: std::env::var("TOKEN_EXP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            accrual_address: normalize_url(
                &std::env::var("ACCRUAL_SYSTEM_ADDRESS")
                    .unwrap_or_else(|_| "localhost:8181".into()),
            ),
            accrual_poll_interval_secs: std::env::var("ACCRUAL_POLL_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            queue_capacity: std::env::var("QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            environment,
        })
    }
}

/// The accrual address may be given without a scheme; default to http.
fn normalize_url(raw: &str) -> String {
    if raw.starts_with("http") {
        raw.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", raw.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_adds_scheme_and_trims_slash() {
        assert_eq!(normalize_url("localhost:8181"), "http://localhost:8181");
        assert_eq!(normalize_url("http://accrual:8181/"), "http://accrual:8181");
        assert_eq!(normalize_url("https://accrual"), "https://accrual");
    }
}
