//! Client for the external accrual service.
//!
//! One synchronous GET per call; any non-200 response is a fetch error
//! without interpreting the body. Retry policy belongs to the caller.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::db::orders::OrderStatus;
use crate::money::Money;

/// Status vocabulary of the external accrual service. An unknown value in
/// the response body fails deserialization and surfaces as a fetch error
/// rather than leaking through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

impl AccrualStatus {
    /// Total mapping into the internal order vocabulary:
    /// REGISTERED means the accrual side has not started yet, so the order
    /// stays NEW; everything else passes through unchanged.
    pub fn to_order_status(self) -> OrderStatus {
        match self {
            AccrualStatus::Registered => OrderStatus::New,
            AccrualStatus::Processing => OrderStatus::Processing,
            AccrualStatus::Invalid => OrderStatus::Invalid,
            AccrualStatus::Processed => OrderStatus::Processed,
        }
    }
}

/// Response of `GET {base}/api/orders/{number}`. The accrual amount is
/// absent until the external side has computed one.
#[derive(Debug, Deserialize)]
pub struct AccrualReply {
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default)]
    pub accrual: Money,
}

#[derive(Debug, Error)]
pub enum AccrualError {
    #[error("accrual service answered with status {0}")]
    UnexpectedStatus(u16),
    #[error("accrual request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait AccrualClient: Send + Sync {
    async fn fetch(&self, order_number: &str) -> Result<AccrualReply, AccrualError>;
}

/// reqwest-backed client against the real accrual service.
pub struct HttpAccrualClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAccrualClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AccrualClient for HttpAccrualClient {
    async fn fetch(&self, order_number: &str) -> Result<AccrualReply, AccrualError> {
        let url = format!("{}/api/orders/{}", self.base_url, order_number);
        let resp = self.client.get(&url).send().await?;

        if resp.status() != reqwest::StatusCode::OK {
            return Err(AccrualError::UnexpectedStatus(resp.status().as_u16()));
        }

        Ok(resp.json::<AccrualReply>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_total() {
        assert_eq!(
            AccrualStatus::Registered.to_order_status(),
            OrderStatus::New
        );
        assert_eq!(
            AccrualStatus::Processing.to_order_status(),
            OrderStatus::Processing
        );
        assert_eq!(
            AccrualStatus::Invalid.to_order_status(),
            OrderStatus::Invalid
        );
        assert_eq!(
            AccrualStatus::Processed.to_order_status(),
            OrderStatus::Processed
        );
    }

    #[test]
    fn reply_decodes_with_and_without_accrual() {
        let reply: AccrualReply =
            serde_json::from_str(r#"{"order":"12345678903","status":"PROCESSED","accrual":729.98}"#)
                .expect("full reply");
        assert_eq!(reply.status, AccrualStatus::Processed);
        assert_eq!(reply.accrual.minor(), 72998);

        let reply: AccrualReply =
            serde_json::from_str(r#"{"order":"12345678903","status":"REGISTERED"}"#)
                .expect("reply without accrual");
        assert_eq!(reply.status, AccrualStatus::Registered);
        assert!(reply.accrual.is_zero());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result: Result<AccrualReply, _> =
            serde_json::from_str(r#"{"order":"1","status":"QUEUED"}"#);
        assert!(result.is_err());
    }
}
