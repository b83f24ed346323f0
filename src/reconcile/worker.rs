//! Single-consumer reconciliation worker.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::queue::{JobQueue, ReconcileJob};
use crate::accrual::AccrualClient;
use crate::db::orders::OrderStatus;
use crate::error::BoxError;
use crate::money::Money;

/// Storage operations the worker needs: apply one accrual verdict
/// atomically (order status/accrual + balance credit commit together).
/// Returns false when the order was already terminal and nothing changed.
#[async_trait]
pub trait ReconcileStore: Send + Sync {
    async fn apply_accrual(
        &self,
        order_number: &str,
        user_id: i64,
        status: OrderStatus,
        accrual: Money,
    ) -> Result<bool, BoxError>;
}

#[async_trait]
impl ReconcileStore for sqlx::PgPool {
    async fn apply_accrual(
        &self,
        order_number: &str,
        user_id: i64,
        status: OrderStatus,
        accrual: Money,
    ) -> Result<bool, BoxError> {
        crate::db::orders::apply_accrual(self, order_number, user_id, status, accrual.minor())
            .await
            .map_err(Into::into)
    }
}

/// Drains the job queue one job at a time: sleep the poll interval, ask
/// the accrual service, apply the verdict, requeue while non-terminal.
///
/// Deliberately serialized: one external round trip in flight at a time,
/// and never more than one queued job per order number, so status updates
/// for the same order cannot race.
pub struct Worker {
    store: Arc<dyn ReconcileStore>,
    accrual: Arc<dyn AccrualClient>,
    requeue: Arc<dyn JobQueue>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl Worker {
    pub fn new(
        store: Arc<dyn ReconcileStore>,
        accrual: Arc<dyn AccrualClient>,
        requeue: Arc<dyn JobQueue>,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            accrual,
            requeue,
            poll_interval,
            shutdown,
        }
    }

    /// Runs until the queue is closed and drained, or the shutdown token
    /// fires. A job already being applied always finishes its transaction.
    pub async fn run(self, mut rx: mpsc::Receiver<ReconcileJob>) {
        tracing::info!("reconciliation worker started");

        loop {
            let job = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                job = rx.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            // Fixed pause before each poll rate-limits the external service.
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            self.process(job).await;
        }

        tracing::info!("reconciliation worker stopped");
    }

    async fn process(&self, job: ReconcileJob) {
        tracing::info!(
            order = %job.order_number,
            user_id = job.user_id,
            "checking accrual"
        );

        let reply = match self.accrual.fetch(&job.order_number).await {
            Ok(reply) => reply,
            Err(e) => {
                // Known gap: a failed fetch abandons the job instead of
                // retrying, leaving the order stuck in its current status
                // for the duration of an accrual outage.
                tracing::error!(
                    order = %job.order_number,
                    user_id = job.user_id,
                    error = %e,
                    "accrual fetch failed, dropping job"
                );
                return;
            }
        };

        let status = reply.status.to_order_status();
        tracing::info!(
            order = %reply.order,
            status = ?reply.status,
            accrual = %reply.accrual,
            "accrual verdict received"
        );

        match self
            .store
            .apply_accrual(&job.order_number, job.user_id, status, reply.accrual)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    order = %job.order_number,
                    "order already terminal, verdict ignored"
                );
                return;
            }
            Err(e) => {
                tracing::error!(
                    order = %job.order_number,
                    user_id = job.user_id,
                    error = %e,
                    "failed to apply accrual verdict"
                );
            }
        }

        if !status.is_terminal() {
            if self.requeue.enqueue(job).await.is_err() {
                tracing::warn!("queue closed, dropping non-terminal job");
            }
        }
    }
}
