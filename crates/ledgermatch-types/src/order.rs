//! Order types mirrored from the ledger's order book.
//!
//! Orders enter the agent only through a fetched ledger snapshot; the
//! agent never creates or mutates them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{LedgerMatchError, OrderId, Price};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

impl std::str::FromStr for Side {
    type Err = LedgerMatchError;

    /// Case-insensitive: `"Buy"`, `"buy"` and `"BUY"` are all [`Side::Buy`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(LedgerMatchError::InvalidSide(s.to_string())),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle status reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = LedgerMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "filled" => Ok(Self::Filled),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(LedgerMatchError::InvalidOrder {
                reason: format!("unknown status '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A resting order as last seen on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: String,
    pub side: Side,
    pub price: Price,
    /// Base quantity still unfilled. Zero means closed.
    pub remaining_base: u128,
    /// Originally requested base quantity, when the view reports it.
    pub amount_base: Option<u128>,
    /// Quote still escrowed by a buy order, when the view reports it.
    pub locked_quote: Option<u128>,
    /// Base still escrowed by a sell order, when the view reports it.
    pub locked_base: Option<u128>,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Minimal open order with only the fields the matcher needs.
    #[must_use]
    pub fn open(
        id: OrderId,
        owner: impl Into<String>,
        side: Side,
        price: Price,
        remaining_base: u128,
    ) -> Self {
        Self {
            id,
            owner: owner.into(),
            side,
            price,
            remaining_base,
            amount_base: None,
            locked_quote: None,
            locked_base: None,
            status: OrderStatus::Open,
            created_at: None,
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.remaining_base == 0 || !self.status.is_open()
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// Open order priced at `num/den`. Panics on a zero denominator.
    pub fn dummy(id: u64, side: Side, num: u128, den: u128, remaining: u128) -> Self {
        let price = Price::new(num, den).expect("test price must have den > 0");
        Self::open(OrderId(id), format!("user{id}.testnet"), side, price, remaining)
    }
}
