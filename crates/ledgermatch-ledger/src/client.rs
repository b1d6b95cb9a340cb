//! NEAR-backed [`OrderSource`] and [`ExecutionSubmitter`].
//!
//! ```text
//! fetch_open_orders: get_orders(0, n) → get_orders(n, n) → … until a short page
//! submit:            view_access_key → sign execute(...) → broadcast_tx_commit
//! ```

use std::future::Future;

use async_trait::async_trait;
use ledgermatch_types::constants::{
    EXECUTE_DEPOSIT_YOCTO, EXECUTE_GAS, EXECUTE_METHOD, GET_ORDERS_METHOD, MAX_PAGES_PER_SNAPSHOT,
};
use ledgermatch_types::{
    AgentConfig, LedgerMatchError, Match, Order, Result, SubmissionReceipt,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::keys::MatcherKey;
use crate::rpc::RpcClient;
use crate::traits::{ExecutionSubmitter, OrderSource};
use crate::tx::{Action, FunctionCallAction, PublicKey, Transaction, decode_block_hash};
use crate::view::decode_page;

#[derive(Debug, Deserialize)]
struct FinalOutcome {
    status: Value,
    #[serde(default)]
    transaction: Option<TxRef>,
}

#[derive(Debug, Deserialize)]
struct TxRef {
    hash: String,
}

/// Ledger client for one order-book contract.
pub struct NearLedger {
    rpc: RpcClient,
    contract_id: String,
    page_size: u64,
    signer: Option<MatcherKey>,
}

impl NearLedger {
    /// Read-only client; [`submit`](ExecutionSubmitter::submit) fails until
    /// a signer is attached.
    pub fn new(rpc: RpcClient, contract_id: impl Into<String>, page_size: u64) -> Self {
        Self {
            rpc,
            contract_id: contract_id.into(),
            page_size: page_size.max(1),
            signer: None,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let rpc = RpcClient::new(&config.network.node_url)?;
        Ok(Self::new(rpc, &config.contract_id, config.page_size))
    }

    #[must_use]
    pub fn with_signer(mut self, key: MatcherKey) -> Self {
        self.signer = Some(key);
        self
    }

    /// Confirm the signer's key is registered for its account; returns the
    /// key's current nonce.
    pub async fn verify_access_key(&self) -> Result<u64> {
        let key = self.require_signer()?;
        let view = self
            .rpc
            .view_access_key(key.account_id(), &key.public_key())
            .await
            .map_err(|e| {
                LedgerMatchError::Credentials(format!(
                    "access key {} for {} not usable: {e}",
                    key.public_key(),
                    key.account_id()
                ))
            })?;
        tracing::info!(
            account = %key.account_id(),
            public_key = %key.public_key(),
            nonce = view.nonce,
            "Access key verified"
        );
        Ok(view.nonce)
    }

    /// One raw `get_orders` page.
    pub async fn fetch_page(&self, from_index: u64, limit: u64) -> Result<Vec<Value>> {
        let args = json!({ "from_index": from_index, "limit": limit });
        let page = self
            .rpc
            .view_json(&self.contract_id, GET_ORDERS_METHOD, &args)
            .await?;
        Ok(page)
    }

    fn require_signer(&self) -> Result<&MatcherKey> {
        self.signer.as_ref().ok_or_else(|| {
            LedgerMatchError::Credentials("no signing key configured".into())
        })
    }

    async fn build_execute_tx(&self, key: &MatcherKey, m: &Match) -> Result<Transaction> {
        let access = self
            .rpc
            .view_access_key(key.account_id(), &key.public_key())
            .await?;
        let nonce = access.nonce.checked_add(1).ok_or_else(|| {
            LedgerMatchError::Internal("access key nonce exhausted".into())
        })?;
        let args = serde_json::to_vec(&execute_args(m))
            .map_err(|e| LedgerMatchError::Serialization(e.to_string()))?;

        Ok(Transaction {
            signer_id: key.account_id().to_string(),
            public_key: PublicKey::Ed25519(key.public_key_bytes()),
            nonce,
            receiver_id: self.contract_id.clone(),
            block_hash: decode_block_hash(&access.block_hash)?,
            actions: vec![Action::FunctionCall(FunctionCallAction {
                method_name: EXECUTE_METHOD.to_string(),
                args,
                gas: EXECUTE_GAS,
                deposit: EXECUTE_DEPOSIT_YOCTO,
            })],
        })
    }
}

#[async_trait]
impl OrderSource for NearLedger {
    async fn fetch_open_orders(&self) -> Result<Vec<Order>> {
        collect_pages(self.page_size, |from, limit| self.fetch_page(from, limit)).await
    }
}

#[async_trait]
impl ExecutionSubmitter for NearLedger {
    async fn submit(&self, m: &Match) -> Result<SubmissionReceipt> {
        let key = self.require_signer()?;
        let signed = self.build_execute_tx(key, m).await?.sign(key.signing_key())?;
        let tx_hash = signed.hash_base58()?;
        tracing::info!(
            maker = %m.maker_id,
            taker = %m.taker_id,
            tx = %tx_hash,
            nonce = signed.transaction.nonce,
            "Broadcasting execute"
        );

        let raw = self.rpc.broadcast_tx_commit(&signed.to_base64()?).await?;
        let outcome: FinalOutcome = serde_json::from_value(raw)
            .map_err(|e| LedgerMatchError::Decode(format!("execution outcome: {e}")))?;
        receipt_from_outcome(outcome, tx_hash)
    }
}

/// Arguments of the contract's `execute`; amounts travel as decimal strings.
pub fn execute_args(m: &Match) -> Value {
    json!({
        "maker_order_id": m.maker_id.as_u64(),
        "taker_order_id": m.taker_id.as_u64(),
        "base_fill": m.base_fill.to_string(),
        "quote_paid": m.quote_paid.to_string(),
    })
}

/// Page through `get_orders` until a short page, decoding as we go.
pub(crate) async fn collect_pages<F, Fut>(page_size: u64, mut fetch: F) -> Result<Vec<Order>>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<Vec<Value>>>,
{
    let mut orders = Vec::new();
    let mut from_index = 0u64;

    for page in 0..MAX_PAGES_PER_SNAPSHOT {
        let entries = fetch(from_index, page_size).await?;
        let returned = u64::try_from(entries.len()).unwrap_or(u64::MAX);
        orders.extend(decode_page(&entries));
        tracing::debug!(page, from_index, returned, "Fetched order page");

        if returned < page_size {
            return Ok(orders);
        }
        from_index = from_index.saturating_add(returned);
    }

    tracing::warn!(
        pages = MAX_PAGES_PER_SNAPSHOT,
        orders = orders.len(),
        "Page limit reached; snapshot may be incomplete"
    );
    Ok(orders)
}

fn receipt_from_outcome(outcome: FinalOutcome, fallback_hash: String) -> Result<SubmissionReceipt> {
    let tx_hash = outcome.transaction.map_or(fallback_hash, |t| t.hash);
    if let Some(failure) = outcome.status.get("Failure") {
        return Err(LedgerMatchError::SubmissionRejected {
            reason: format!("tx {tx_hash}: {failure}"),
        });
    }
    if outcome.status.get("SuccessValue").is_some()
        || outcome.status.get("SuccessReceiptId").is_some()
    {
        return Ok(SubmissionReceipt { tx_hash });
    }
    Err(LedgerMatchError::SubmissionRejected {
        reason: format!("tx {tx_hash}: unexpected status {}", outcome.status),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ledgermatch_types::OrderId;

    use super::*;

    fn entry(id: u64) -> Value {
        json!([id, "a.testnet", if id % 2 == 0 { "Buy" } else { "Sell" }, "1", "1", "5", "5", "0", "0", "Open", 0])
    }

    fn book(n: u64) -> Vec<Value> {
        (0..n).map(entry).collect()
    }

    #[test]
    fn execute_args_use_string_amounts() {
        let m = Match {
            maker_id: OrderId(1),
            taker_id: OrderId(2),
            base_fill: u128::MAX,
            quote_paid: 15,
        };
        assert_eq!(
            execute_args(&m),
            json!({
                "maker_order_id": 1,
                "taker_order_id": 2,
                "base_fill": "340282366920938463463374607431768211455",
                "quote_paid": "15",
            })
        );
    }

    #[tokio::test]
    async fn pagination_stops_on_short_page() {
        let all = book(5);
        let calls = Mutex::new(Vec::new());
        let orders = collect_pages(2, |from, limit| {
            calls.lock().unwrap().push((from, limit));
            let start = usize::try_from(from).unwrap().min(all.len());
            let end = (start + usize::try_from(limit).unwrap()).min(all.len());
            let page = all[start..end].to_vec();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(orders.len(), 5);
        assert_eq!(*calls.lock().unwrap(), vec![(0, 2), (2, 2), (4, 2)]);
    }

    #[tokio::test]
    async fn exact_multiple_needs_one_empty_page() {
        let all = book(4);
        let calls = Mutex::new(0u32);
        let orders = collect_pages(2, |from, _| {
            *calls.lock().unwrap() += 1;
            let start = usize::try_from(from).unwrap().min(all.len());
            let page = all[start..(start + 2).min(all.len())].to_vec();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(orders.len(), 4);
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn page_failure_fails_snapshot() {
        let result = collect_pages(2, |from, _| async move {
            if from == 0 {
                Ok(book(2))
            } else {
                Err(LedgerMatchError::Transport("connection reset".into()))
            }
        })
        .await;
        assert!(matches!(result, Err(LedgerMatchError::Transport(_))));
    }

    #[test]
    fn success_outcome_yields_receipt() {
        let outcome: FinalOutcome = serde_json::from_value(json!({
            "status": {"SuccessValue": ""},
            "transaction": {"hash": "9xH"},
        }))
        .unwrap();
        let receipt = receipt_from_outcome(outcome, "local".into()).unwrap();
        assert_eq!(receipt.tx_hash, "9xH");
    }

    #[test]
    fn failure_outcome_is_rejection() {
        let outcome: FinalOutcome = serde_json::from_value(json!({
            "status": {"Failure": {"ActionError": {"kind": {"FunctionCallError": {"ExecutionError": "Smart contract panicked: price below maker's minimum"}}}}},
        }))
        .unwrap();
        let err = receipt_from_outcome(outcome, "local".into()).unwrap_err();
        match err {
            LedgerMatchError::SubmissionRejected { reason } => {
                assert!(reason.starts_with("tx local:"));
                assert!(reason.contains("price below maker"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_status_is_rejection() {
        let outcome: FinalOutcome =
            serde_json::from_value(json!({ "status": "NotStarted" })).unwrap();
        assert!(receipt_from_outcome(outcome, "h".into()).is_err());
    }

    #[tokio::test]
    async fn submit_without_signer_is_credential_error() {
        let ledger = NearLedger::new(RpcClient::new("http://127.0.0.1:9").unwrap(), "ob.testnet", 10);
        let m = Match {
            maker_id: OrderId(1),
            taker_id: OrderId(2),
            base_fill: 1,
            quote_paid: 1,
        };
        assert!(matches!(
            ledger.submit(&m).await,
            Err(LedgerMatchError::Credentials(_))
        ));
        assert!(ledger.verify_access_key().await.is_err());
    }
}
