//! NEAR transaction encoding and signing.
//!
//! Only the subset needed to call a contract method is modelled: one
//! ed25519 signer, `FunctionCall` actions. Layout follows the protocol's
//! borsh schema exactly; field order matters.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use borsh::BorshSerialize;
use ed25519_dalek::{Signer, SigningKey};
use ledgermatch_types::{LedgerMatchError, Result};
use sha2::{Digest, Sha256};

/// Borsh enum index of `FunctionCall` in the protocol's `Action` enum.
const FUNCTION_CALL_ACTION_INDEX: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub enum PublicKey {
    Ed25519([u8; 32]),
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct FunctionCallAction {
    pub method_name: String,
    pub args: Vec<u8>,
    pub gas: u64,
    pub deposit: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FunctionCall(FunctionCallAction),
}

impl BorshSerialize for Action {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            Self::FunctionCall(call) => {
                FUNCTION_CALL_ACTION_INDEX.serialize(writer)?;
                call.serialize(writer)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct Transaction {
    pub signer_id: String,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: String,
    pub block_hash: [u8; 32],
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub enum Signature {
    Ed25519([u8; 64]),
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Signature,
}

impl Transaction {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        borsh::to_vec(self).map_err(|e| LedgerMatchError::Serialization(e.to_string()))
    }

    /// SHA-256 of the borsh encoding; this is what gets signed and what the
    /// node reports as the transaction hash.
    pub fn hash(&self) -> Result<[u8; 32]> {
        let digest = Sha256::digest(self.to_bytes()?);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Ok(out)
    }

    pub fn sign(self, key: &SigningKey) -> Result<SignedTransaction> {
        let hash = self.hash()?;
        let signature = key.sign(&hash);
        Ok(SignedTransaction {
            transaction: self,
            signature: Signature::Ed25519(signature.to_bytes()),
        })
    }
}

impl SignedTransaction {
    /// Base58 transaction hash, as shown by explorers.
    pub fn hash_base58(&self) -> Result<String> {
        Ok(bs58::encode(self.transaction.hash()?).into_string())
    }

    /// Base64 borsh encoding expected by `broadcast_tx_commit`.
    pub fn to_base64(&self) -> Result<String> {
        let bytes =
            borsh::to_vec(self).map_err(|e| LedgerMatchError::Serialization(e.to_string()))?;
        Ok(BASE64.encode(bytes))
    }
}

/// Decode a base58 block hash as returned by `view_access_key`.
pub fn decode_block_hash(encoded: &str) -> Result<[u8; 32]> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| LedgerMatchError::Decode(format!("block hash {encoded:?}: {e}")))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        LedgerMatchError::Decode(format!(
            "block hash {encoded:?} is {} bytes, expected 32",
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::Verifier;

    use super::*;

    fn fixture() -> (SigningKey, Transaction) {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let tx = Transaction {
            signer_id: "m".into(),
            public_key: PublicKey::Ed25519(key.verifying_key().to_bytes()),
            nonce: 5,
            receiver_id: "ob".into(),
            block_hash: [9u8; 32],
            actions: vec![Action::FunctionCall(FunctionCallAction {
                method_name: "execute".into(),
                args: b"{}".to_vec(),
                gas: 150_000_000_000_000,
                deposit: 1,
            })],
        };
        (key, tx)
    }

    #[test]
    fn borsh_layout_matches_protocol() {
        let (key, tx) = fixture();
        let bytes = tx.to_bytes().unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(b"m");
        expected.push(0); // ed25519 key type
        expected.extend_from_slice(&key.verifying_key().to_bytes());
        expected.extend_from_slice(&5u64.to_le_bytes());
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(b"ob");
        expected.extend_from_slice(&[9u8; 32]);
        expected.extend_from_slice(&1u32.to_le_bytes()); // one action
        expected.push(2); // FunctionCall
        expected.extend_from_slice(&7u32.to_le_bytes());
        expected.extend_from_slice(b"execute");
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(b"{}");
        expected.extend_from_slice(&150_000_000_000_000u64.to_le_bytes());
        expected.extend_from_slice(&1u128.to_le_bytes());

        assert_eq!(bytes, expected);
    }

    #[test]
    fn signature_verifies_over_tx_hash() {
        let (key, tx) = fixture();
        let hash = tx.hash().unwrap();
        let signed = tx.sign(&key).unwrap();

        let Signature::Ed25519(raw) = signed.signature;
        let sig = ed25519_dalek::Signature::from_bytes(&raw);
        assert!(key.verifying_key().verify(&hash, &sig).is_ok());
    }

    #[test]
    fn signed_encoding_appends_signature() {
        let (key, tx) = fixture();
        let unsigned_len = tx.to_bytes().unwrap().len();
        let signed = tx.sign(&key).unwrap();

        let b64 = signed.to_base64().unwrap();
        let decoded = BASE64.decode(b64).unwrap();
        assert_eq!(decoded.len(), unsigned_len + 1 + 64);
        assert_eq!(decoded[unsigned_len], 0);
        assert!(signed.hash_base58().unwrap().len() >= 43);
    }

    #[test]
    fn block_hash_round_trips_through_base58() {
        let encoded = bs58::encode([3u8; 32]).into_string();
        assert_eq!(decode_block_hash(&encoded).unwrap(), [3u8; 32]);
        assert!(decode_block_hash("0OIl").is_err());
        assert!(decode_block_hash(&bs58::encode([1u8; 8]).into_string()).is_err());
    }
}
