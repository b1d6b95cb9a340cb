//! Submission quarantine: refuses to resubmit the same match too soon.
//!
//! The ledger may not yet reflect an execution when the next poll runs, so
//! the selector can pick the identical pair again. Each attempted match is
//! remembered by fingerprint for a fixed window; a repeat inside the window
//! returns [`LedgerMatchError::DuplicateSubmission`].
//!
//! Memory is bounded: at `max_size` entries the oldest is evicted.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use ledgermatch_matchcore::MatchFingerprint;
use ledgermatch_types::{LedgerMatchError, Result};

pub struct SubmissionQuarantine {
    /// Fingerprint → time of the latest attempt.
    recent: HashMap<MatchFingerprint, Instant>,
    /// Attempts in insertion order (front = oldest). May hold stale
    /// entries for fingerprints that were re-recorded later.
    order: VecDeque<(MatchFingerprint, Instant)>,
    window: Duration,
    max_size: usize,
}

impl SubmissionQuarantine {
    /// A zero `window` disables the quarantine. `max_size` is at least 1.
    pub fn new(window: Duration, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            recent: HashMap::new(),
            order: VecDeque::new(),
            window,
            max_size,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Fails if `fp` was recorded less than one window before `now`.
    pub fn check(&self, fp: &MatchFingerprint, now: Instant) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        match self.recent.get(fp) {
            Some(&at) if now.saturating_duration_since(at) < self.window => {
                Err(LedgerMatchError::DuplicateSubmission {
                    fingerprint: fp.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Remember an attempt of `fp` at `now`.
    pub fn record(&mut self, fp: MatchFingerprint, now: Instant) {
        if !self.is_enabled() {
            return;
        }
        self.prune(now);
        while self.recent.len() >= self.max_size && !self.recent.contains_key(&fp) {
            let Some((oldest, at)) = self.order.pop_front() else {
                break;
            };
            self.forget(oldest, at);
        }
        self.recent.insert(fp, now);
        self.order.push_back((fp, now));
    }

    /// Drop every attempt older than one window.
    pub fn prune(&mut self, now: Instant) {
        while let Some(&(fp, at)) = self.order.front() {
            if now.saturating_duration_since(at) < self.window {
                break;
            }
            self.order.pop_front();
            self.forget(fp, at);
        }
    }

    /// Fingerprints currently quarantined (expired ones may linger until
    /// the next prune).
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Remove `fp` only if `at` is still its latest attempt.
    fn forget(&mut self, fp: MatchFingerprint, at: Instant) {
        if self.recent.get(&fp) == Some(&at) {
            self.recent.remove(&fp);
        }
    }
}

#[cfg(test)]
mod tests {
    use ledgermatch_types::{Match, OrderId};

    use super::*;

    fn fp(maker: u64) -> MatchFingerprint {
        MatchFingerprint::of(&Match {
            maker_id: OrderId(maker),
            taker_id: OrderId(1_000),
            base_fill: 5,
            quote_paid: 15,
        })
    }

    #[test]
    fn repeat_within_window_blocked() {
        let t0 = Instant::now();
        let mut q = SubmissionQuarantine::new(Duration::from_secs(30), 100);
        assert!(q.check(&fp(1), t0).is_ok());
        q.record(fp(1), t0);

        let err = q.check(&fp(1), t0 + Duration::from_secs(29)).unwrap_err();
        assert!(matches!(err, LedgerMatchError::DuplicateSubmission { .. }));
        assert!(q.check(&fp(2), t0).is_ok());
    }

    #[test]
    fn repeat_after_window_allowed() {
        let t0 = Instant::now();
        let mut q = SubmissionQuarantine::new(Duration::from_secs(30), 100);
        q.record(fp(1), t0);
        let later = t0 + Duration::from_secs(30);
        assert!(q.check(&fp(1), later).is_ok());

        q.prune(later);
        assert!(q.is_empty());
    }

    #[test]
    fn zero_window_disables() {
        let t0 = Instant::now();
        let mut q = SubmissionQuarantine::new(Duration::ZERO, 100);
        q.record(fp(1), t0);
        assert!(!q.is_enabled());
        assert!(q.check(&fp(1), t0).is_ok());
        assert!(q.is_empty());
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let t0 = Instant::now();
        let mut q = SubmissionQuarantine::new(Duration::from_secs(30), 3);
        for maker in 1..=4 {
            q.record(fp(maker), t0 + Duration::from_millis(maker));
        }
        assert_eq!(q.len(), 3);
        let now = t0 + Duration::from_secs(1);
        assert!(q.check(&fp(1), now).is_ok(), "oldest should be evicted");
        assert!(q.check(&fp(2), now).is_err());
        assert!(q.check(&fp(4), now).is_err());
    }

    #[test]
    fn re_record_extends_window() {
        let t0 = Instant::now();
        let mut q = SubmissionQuarantine::new(Duration::from_secs(10), 10);
        q.record(fp(1), t0);
        q.record(fp(1), t0 + Duration::from_secs(8));

        // The first attempt expires, the second still holds.
        let now = t0 + Duration::from_secs(12);
        q.prune(now);
        assert_eq!(q.len(), 1);
        assert!(q.check(&fp(1), now).is_err());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let t0 = Instant::now();
        let mut q = SubmissionQuarantine::new(Duration::from_secs(5), 0);
        q.record(fp(1), t0);
        q.record(fp(2), t0);
        assert_eq!(q.len(), 1);
        assert!(q.check(&fp(2), t0).is_err());
    }
}
