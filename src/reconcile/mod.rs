//! Order-accrual reconciliation engine.
//!
//! A bounded in-memory queue of `(order number, user id)` jobs feeds one
//! worker that polls the external accrual service and advances each order
//! until it reaches INVALID or PROCESSED. The queue contents are not
//! persisted: a crash loses in-flight jobs, the stated trade-off of the
//! in-memory design. A durable substitute can re-derive pending jobs as
//! "all orders not yet terminal" without touching the worker.

mod queue;
mod worker;

pub use queue::{ChannelQueue, JobQueue, QueueClosed, ReconcileJob};
pub use worker::{ReconcileStore, Worker};
