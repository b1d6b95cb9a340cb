//! # ledgermatch-matchcore
//!
//! **Pure crossing engine for LedgerMatch.**
//!
//! MatchCore is the compute plane -- it takes a snapshot of the ledger's
//! open orders and picks at most one executable pair. It has:
//!
//! - **Zero side effects**: no ledger calls, no clocks, no shared state
//! - **Exact arithmetic**: rational prices compared by 256-bit cross products
//! - **Maker-favoured settlement**: quote rounded up at the resting price
//! - **Deterministic output**: same snapshot -> same match

pub mod comparator;
pub mod fingerprint;
pub mod mirror;
pub mod preflight;
pub mod selector;

pub use comparator::{cmp_price, crosses, ge, le};
pub use fingerprint::MatchFingerprint;
pub use mirror::OrderMirror;
pub use preflight::{check_execution, check_in_mirror};
pub use selector::{quote_for, select_from, select_match};
