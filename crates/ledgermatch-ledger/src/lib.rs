//! # ledgermatch-ledger
//!
//! **Ledger access for LedgerMatch.**
//!
//! Everything that talks to the NEAR node lives here, behind two traits
//! the poll loop depends on:
//!
//! - [`OrderSource`]: paged `get_orders` snapshots decoded into [`Order`]s
//! - [`ExecutionSubmitter`]: signed `execute` function calls
//!
//! [`NearLedger`] implements both over JSON-RPC.
//!
//! [`Order`]: ledgermatch_types::Order

pub mod client;
pub mod keys;
pub mod rpc;
pub mod traits;
pub mod tx;
pub mod view;

pub use client::{NearLedger, execute_args};
pub use keys::{MatcherKey, default_credentials_path};
pub use rpc::{RpcClient, RpcError};
pub use traits::{ExecutionSubmitter, OrderSource};
pub use view::{OrderView, WireU128, decode_page};
