//! Seams between the poll loop and the ledger.
//!
//! The loop depends only on these two traits; the NEAR client implements
//! both, and tests substitute in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use ledgermatch_types::{Match, Order, Result, SubmissionReceipt};

/// Source of the ledger's open orders.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Full snapshot of open orders with non-zero remaining base.
    async fn fetch_open_orders(&self) -> Result<Vec<Order>>;
}

/// Sends a selected match to the ledger for execution.
#[async_trait]
pub trait ExecutionSubmitter: Send + Sync {
    /// Submit one execution and wait for the ledger's verdict.
    async fn submit(&self, m: &Match) -> Result<SubmissionReceipt>;
}

#[async_trait]
impl<T: OrderSource + ?Sized> OrderSource for Arc<T> {
    async fn fetch_open_orders(&self) -> Result<Vec<Order>> {
        (**self).fetch_open_orders().await
    }
}

#[async_trait]
impl<T: ExecutionSubmitter + ?Sized> ExecutionSubmitter for Arc<T> {
    async fn submit(&self, m: &Match) -> Result<SubmissionReceipt> {
        (**self).submit(m).await
    }
}
