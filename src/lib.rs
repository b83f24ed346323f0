//! loyalty-server: loyalty-points ledger
//!
//! Users submit purchase-order numbers; an external accrual service
//! asynchronously computes a reward per order, which a background worker
//! credits to the user's balance. Balances can be partially withdrawn.
//!
//! The interesting part is the reconciliation engine in [`reconcile`]:
//! a bounded job queue plus a single worker that polls the accrual
//! service until every order reaches a terminal verdict, keeping order
//! state and the balance ledger consistent under concurrent access.

pub mod accrual;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod luhn;
pub mod money;
pub mod reconcile;
pub mod state;
