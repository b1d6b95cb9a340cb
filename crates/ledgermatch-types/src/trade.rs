//! Match types produced by the selector and consumed by the submitter.
//!
//! A [`Match`] names one maker (resting sell) and one taker (crossing buy)
//! with the exact base fill and the quote the taker pays at the maker's
//! price, rounded up.

use serde::Serialize;

use crate::OrderId;

/// One crossing pair selected for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Match {
    /// The resting sell order whose price governs settlement.
    pub maker_id: OrderId,
    /// The crossing buy order.
    pub taker_id: OrderId,
    /// Base units exchanged.
    pub base_fill: u128,
    /// Quote units paid = ceil(base_fill × maker price).
    pub quote_paid: u128,
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Match[maker {} taker {}] base {} quote {}",
            self.maker_id, self.taker_id, self.base_fill, self.quote_paid,
        )
    }
}

/// Ledger acknowledgement of a submitted execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    /// Transaction hash as reported by the ledger node.
    pub tx_hash: String,
}
