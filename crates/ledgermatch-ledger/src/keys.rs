//! Matcher signing key.
//!
//! The key comes from an explicit secret (`ed25519:<base58>`) when one is
//! supplied, otherwise from the NEAR CLI credentials file
//! `~/.near-credentials/<network>/<account>.json`.

use std::fmt;
use std::path::{Path, PathBuf};

use ed25519_dalek::SigningKey;
use ledgermatch_types::{LedgerMatchError, Result};
use serde::Deserialize;

const KEY_PREFIX: &str = "ed25519:";

#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    public_key: Option<String>,
    #[serde(alias = "secret_key")]
    private_key: String,
}

/// The matcher account together with its full-access signing key.
pub struct MatcherKey {
    account_id: String,
    signing: SigningKey,
}

impl fmt::Debug for MatcherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherKey")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl MatcherKey {
    /// Parse an `ed25519:<base58>` secret holding a 64-byte keypair or a
    /// 32-byte seed.
    pub fn from_secret(account_id: impl Into<String>, secret: &str) -> Result<Self> {
        let encoded = secret
            .trim()
            .strip_prefix(KEY_PREFIX)
            .ok_or_else(|| credentials("secret key must start with \"ed25519:\""))?;
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| credentials(&format!("secret key is not base58: {e}")))?;

        let signing = match bytes.len() {
            64 => {
                let mut pair = [0u8; 64];
                pair.copy_from_slice(&bytes);
                SigningKey::from_keypair_bytes(&pair)
                    .map_err(|_| credentials("secret key does not match its public half"))?
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                SigningKey::from_bytes(&seed)
            }
            n => return Err(credentials(&format!("secret key is {n} bytes, expected 32 or 64"))),
        };

        Ok(Self {
            account_id: account_id.into(),
            signing,
        })
    }

    /// Read a NEAR CLI credentials file.
    ///
    /// The file's `account_id` and `public_key`, when present, must agree
    /// with the requested account and with the secret.
    pub fn from_file(account_id: &str, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            credentials(&format!("cannot read {}: {e}", path.display()))
        })?;
        let file: CredentialsFile = serde_json::from_str(&raw).map_err(|e| {
            credentials(&format!("malformed credentials {}: {e}", path.display()))
        })?;

        if let Some(file_account) = &file.account_id {
            if file_account != account_id {
                return Err(credentials(&format!(
                    "{} belongs to {file_account}, not {account_id}",
                    path.display()
                )));
            }
        }

        let key = Self::from_secret(account_id, &file.private_key)?;
        if let Some(public) = &file.public_key {
            if public.trim() != key.public_key() {
                return Err(credentials(&format!(
                    "public key in {} does not match its private key",
                    path.display()
                )));
            }
        }
        Ok(key)
    }

    /// Resolve the key: explicit secret first, then the credentials file
    /// (explicit path or the NEAR CLI default for `network_id`).
    pub fn resolve(
        account_id: &str,
        network_id: &str,
        credentials_path: Option<&Path>,
        secret: Option<&str>,
    ) -> Result<Self> {
        if let Some(secret) = secret.filter(|s| !s.trim().is_empty()) {
            return Self::from_secret(account_id, secret);
        }
        let path = match credentials_path {
            Some(p) => p.to_path_buf(),
            None => default_credentials_path(network_id, account_id)?,
        };
        Self::from_file(account_id, &path)
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// `ed25519:<base58>` form used by RPC queries and credentials files.
    pub fn public_key(&self) -> String {
        format!(
            "{KEY_PREFIX}{}",
            bs58::encode(self.public_key_bytes()).into_string()
        )
    }
}

/// `$HOME/.near-credentials/<network>/<account>.json`.
pub fn default_credentials_path(network_id: &str, account_id: &str) -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| credentials("HOME is not set; pass a credentials path"))?;
    Ok(PathBuf::from(home)
        .join(".near-credentials")
        .join(network_id)
        .join(format!("{account_id}.json")))
}

fn credentials(msg: &str) -> LedgerMatchError {
    LedgerMatchError::Credentials(msg.to_string())
}
