//! Stable fingerprints of selected matches.
//!
//! The agent does not know when the ledger will reflect an execution, so
//! the same pair can be selected again on the next poll. A fingerprint
//! identifies "this exact execution" (maker, taker, fill, quote) so the
//! loop can refuse to resubmit it while the ledger catches up. Once the
//! ledger applies the fill, remainders change and so does the fingerprint.

use std::fmt;

use ledgermatch_types::Match;
use sha2::{Digest, Sha256};

/// SHA-256 digest of a [`Match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchFingerprint(pub [u8; 32]);

impl MatchFingerprint {
    /// Compute the fingerprint of a match.
    ///
    /// Depends on maker id, taker id, base fill and quote paid, in that
    /// order. Equal matches always produce equal fingerprints.
    #[must_use]
    pub fn of(m: &Match) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"ledgermatch:match:v1:");
        hasher.update(m.maker_id.0.to_le_bytes());
        hasher.update(m.taker_id.0.to_le_bytes());
        hasher.update(m.base_fill.to_le_bytes());
        hasher.update(m.quote_paid.to_le_bytes());

        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        Self(digest)
    }

    /// First 8 hex characters, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for MatchFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use ledgermatch_types::OrderId;

    use super::*;

    fn make_match(maker: u64, taker: u64, fill: u128, quote: u128) -> Match {
        Match {
            maker_id: OrderId(maker),
            taker_id: OrderId(taker),
            base_fill: fill,
            quote_paid: quote,
        }
    }

    #[test]
    fn same_match_same_fingerprint() {
        let a = MatchFingerprint::of(&make_match(1, 2, 5, 15));
        let b = MatchFingerprint::of(&make_match(1, 2, 5, 15));
        assert_eq!(a, b);
    }

    #[test]
    fn every_field_matters() {
        let base = MatchFingerprint::of(&make_match(1, 2, 5, 15));
        assert_ne!(base, MatchFingerprint::of(&make_match(9, 2, 5, 15)));
        assert_ne!(base, MatchFingerprint::of(&make_match(1, 9, 5, 15)));
        assert_ne!(base, MatchFingerprint::of(&make_match(1, 2, 4, 15)));
        assert_ne!(base, MatchFingerprint::of(&make_match(1, 2, 5, 14)));
    }

    #[test]
    fn maker_and_taker_are_not_interchangeable() {
        let ab = MatchFingerprint::of(&make_match(1, 2, 5, 15));
        let ba = MatchFingerprint::of(&make_match(2, 1, 5, 15));
        assert_ne!(ab, ba);
    }

    #[test]
    fn display_is_full_hex() {
        let fp = MatchFingerprint::of(&make_match(1, 2, 5, 15));
        assert_eq!(fp.to_string().len(), 64);
        assert_eq!(fp.short().len(), 8);
        assert!(fp.to_string().starts_with(&fp.short()));
    }
}
