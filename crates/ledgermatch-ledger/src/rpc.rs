//! Minimal NEAR JSON-RPC 2.0 client.
//!
//! Three calls are needed: `query/call_function` for contract views,
//! `query/view_access_key` for nonce and block hash, and
//! `broadcast_tx_commit` for signed transactions.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ledgermatch_types::{LedgerMatchError, constants};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("node error {name}: {message}")]
    Node { name: String, message: String },
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl From<RpcError> for LedgerMatchError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Http(e) => LedgerMatchError::Transport(e.to_string()),
            RpcError::Json(e) => LedgerMatchError::Decode(e.to_string()),
            RpcError::Node { name, message } => LedgerMatchError::Rpc { name, message },
            RpcError::Unexpected(msg) => LedgerMatchError::Decode(msg),
        }
    }
}

/// `view_access_key` result, reduced to what transaction building needs.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessKeyView {
    pub nonce: u64,
    /// Base58 hash of the block the view was taken at.
    pub block_hash: String,
}

#[derive(Debug, Deserialize)]
struct CallResult {
    result: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cause: Option<ErrorCause>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorCause {
    name: String,
    #[serde(default)]
    info: Option<Value>,
}

#[derive(Debug, Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: P,
}

/// JSON-RPC transport bound to one node URL.
#[derive(Clone)]
pub struct RpcClient {
    http: Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(constants::RPC_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and decode its `result`.
    pub async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<T, RpcError> {
        let request = Request {
            jsonrpc: "2.0",
            id: constants::RPC_REQUEST_ID,
            method,
            params,
        };
        let resp = self.http.post(&self.url).json(&request).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        // The node reports most failures as HTTP 200 with an error object;
        // only fall back to the status line when the body is not JSON-RPC.
        match decode_response(&text) {
            Err(RpcError::Json(_)) if !status.is_success() => Err(RpcError::Unexpected(format!(
                "HTTP {status}: {}",
                truncate(&text, 200)
            ))),
            other => other,
        }
    }

    /// Call a view method; returns the raw bytes the contract produced.
    pub async fn call_function(
        &self,
        account_id: &str,
        method_name: &str,
        args: &Value,
    ) -> Result<Vec<u8>, RpcError> {
        let args_base64 = BASE64.encode(serde_json::to_vec(args)?);
        let out: CallResult = self
            .call(
                "query",
                json!({
                    "request_type": "call_function",
                    "finality": "final",
                    "account_id": account_id,
                    "method_name": method_name,
                    "args_base64": args_base64,
                }),
            )
            .await?;
        Ok(out.result)
    }

    /// Call a view method and parse its output as JSON.
    pub async fn view_json<T: DeserializeOwned>(
        &self,
        account_id: &str,
        method_name: &str,
        args: &Value,
    ) -> Result<T, RpcError> {
        let bytes = self.call_function(account_id, method_name, args).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn view_access_key(
        &self,
        account_id: &str,
        public_key: &str,
    ) -> Result<AccessKeyView, RpcError> {
        self.call(
            "query",
            json!({
                "request_type": "view_access_key",
                "finality": "final",
                "account_id": account_id,
                "public_key": public_key,
            }),
        )
        .await
    }

    /// Broadcast a base64 borsh `SignedTransaction` and wait for its outcome.
    pub async fn broadcast_tx_commit(&self, signed_tx_base64: &str) -> Result<Value, RpcError> {
        self.call("broadcast_tx_commit", json!([signed_tx_base64]))
            .await
    }
}

/// Decode a JSON-RPC response body into `T`.
///
/// `query` failures can also arrive inside `result` as an `error` string
/// (contract panics, unknown accounts on older nodes); those become
/// [`RpcError::Node`] too.
pub(crate) fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, RpcError> {
    let envelope: Envelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.error {
        return Err(node_error(err));
    }
    let result = envelope
        .result
        .ok_or_else(|| RpcError::Unexpected("response has neither result nor error".into()))?;
    if let Some(message) = result.get("error").and_then(Value::as_str) {
        return Err(RpcError::Node {
            name: "QUERY_ERROR".into(),
            message: message.to_string(),
        });
    }
    Ok(serde_json::from_value(result)?)
}

fn node_error(body: ErrorBody) -> RpcError {
    let (name, detail) = match body.cause {
        Some(cause) => (cause.name, cause.info.map(|v| v.to_string())),
        None => (body.name.unwrap_or_else(|| "UNKNOWN".into()), None),
    };
    let message = detail
        .or_else(|| body.data.map(|d| d.as_str().map_or_else(|| d.to_string(), str::to_string)))
        .or(body.message)
        .unwrap_or_default();
    RpcError::Node { name, message }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
