//! # ledgermatch-agent
//!
//! **The LedgerMatch polling agent.**
//!
//! Wires a ledger [`OrderSource`](ledgermatch_ledger::OrderSource) and
//! [`ExecutionSubmitter`](ledgermatch_ledger::ExecutionSubmitter) to the
//! crossing engine and drives them on a fixed cadence:
//!
//! ```text
//! INIT → CYCLE(fetch → rebuild mirror → select → maybe-submit) → SLEEP → CYCLE …
//! ```

pub mod cli;
pub mod logging;
pub mod poll_loop;
pub mod quarantine;

pub use cli::Cli;
pub use poll_loop::{CycleOutcome, FailureStage, PollLoop};
pub use quarantine::SubmissionQuarantine;
