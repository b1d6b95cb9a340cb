//! # ledgermatch-types
//!
//! Shared types, errors, and configuration for the **LedgerMatch** agent.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`CycleId`]
//! - **Price model**: [`Price`] (exact rational, quote per base)
//! - **Order model**: [`Order`], [`Side`], [`OrderStatus`]
//! - **Match model**: [`Match`], [`SubmissionReceipt`]
//! - **Configuration**: [`AgentConfig`], [`NetworkConfig`], [`LogFormat`]
//! - **Errors**: [`LedgerMatchError`] with `LM_ERR_` prefix codes
//! - **Constants**: ledger call budgets and loop defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod price;
pub mod trade;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use price::*;
pub use trade::*;

// Constants are accessed via `ledgermatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
