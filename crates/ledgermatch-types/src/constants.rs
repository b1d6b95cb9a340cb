//! System-wide constants for the LedgerMatch agent.

/// Gas attached to every `execute` call (150 Tgas).
pub const EXECUTE_GAS: u64 = 150_000_000_000_000;

/// Deposit attached to every `execute` call (1 yoctoNEAR, required by the
/// contract's one-yocto guard).
pub const EXECUTE_DEPOSIT_YOCTO: u128 = 1;

/// Contract view returning pages of orders.
pub const GET_ORDERS_METHOD: &str = "get_orders";

/// Contract call executing one match.
pub const EXECUTE_METHOD: &str = "execute";

/// Default delay between poll cycles in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

/// Default `limit` for each `get_orders` page.
pub const DEFAULT_PAGE_SIZE: u64 = 200;

/// Upper bound on pages fetched per snapshot.
pub const MAX_PAGES_PER_SNAPSHOT: u64 = 1_000;

/// Default window during which an identical match is not resubmitted.
pub const DEFAULT_QUARANTINE_SECS: u64 = 30;

/// Maximum fingerprints remembered by the submission quarantine.
pub const QUARANTINE_CACHE_SIZE: usize = 10_000;

/// Default ledger network.
pub const DEFAULT_NETWORK: &str = "testnet";

/// Default log filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Per-request timeout on the ledger node's JSON-RPC endpoint.
pub const RPC_TIMEOUT_SECS: u64 = 30;

/// JSON-RPC request id sent with every call.
pub const RPC_REQUEST_ID: &str = "ledgermatch";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Agent name.
pub const AGENT_NAME: &str = "LedgerMatch";
