//! The matching cycle.
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌──────────┐   ┌───────────┐
//! │ fetch orders │──▶│ rebuild mirror│──▶│  select  │──▶│ preflight │
//! └──────────────┘   └───────────────┘   └──────────┘   └─────┬─────┘
//!                                                             │
//!                       dry run: report ◀─────────────────────┤
//!                                                             ▼
//!                                           quarantine ──▶ submit
//! ```
//!
//! Every cycle ends in a [`CycleOutcome`]. Failures are logged and turned
//! into outcomes; nothing escapes the loop.

use std::time::{Duration, Instant};

use ledgermatch_ledger::{ExecutionSubmitter, OrderSource};
use ledgermatch_matchcore::{MatchFingerprint, OrderMirror, check_in_mirror, select_match};
use ledgermatch_types::constants::QUARANTINE_CACHE_SIZE;
use ledgermatch_types::{AgentConfig, CycleId, LedgerMatchError, Match, Result, SubmissionReceipt};

use crate::quarantine::SubmissionQuarantine;

/// Where a failed cycle gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Fetch,
    Submit,
}

/// How one cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// No crossing pair in the snapshot.
    NoMatch,
    /// Dry run: the match was logged and discarded.
    Reported(Match),
    /// The ledger accepted the execution.
    Submitted {
        m: Match,
        receipt: SubmissionReceipt,
    },
    /// The same match was attempted within the quarantine window.
    Quarantined(Match),
    /// The match would fail the ledger's execution checks; not submitted.
    Rejected {
        m: Match,
        error: LedgerMatchError,
    },
    Failed {
        stage: FailureStage,
        error: LedgerMatchError,
    },
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoMatch => "no_match",
            Self::Reported(_) => "reported",
            Self::Submitted { .. } => "submitted",
            Self::Quarantined(_) => "quarantined",
            Self::Rejected { .. } => "rejected",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn matched(&self) -> Option<&Match> {
        match self {
            Self::Reported(m) | Self::Quarantined(m) => Some(m),
            Self::Submitted { m, .. } | Self::Rejected { m, .. } => Some(m),
            Self::NoMatch | Self::Failed { .. } => None,
        }
    }
}

/// Poll → match → submit loop over one order source and one submitter.
pub struct PollLoop<S, X> {
    source: S,
    submitter: X,
    mirror: OrderMirror,
    quarantine: SubmissionQuarantine,
    dry_run: bool,
    interval: Duration,
    cycle: CycleId,
    /// Top-ranked pair rejected by preflight in consecutive cycles.
    blocked: Option<(MatchFingerprint, u32)>,
}

impl<S: OrderSource, X: ExecutionSubmitter> PollLoop<S, X> {
    pub fn new(config: &AgentConfig, source: S, submitter: X) -> Self {
        Self {
            source,
            submitter,
            mirror: OrderMirror::new(),
            quarantine: SubmissionQuarantine::new(
                config.quarantine_window(),
                QUARANTINE_CACHE_SIZE,
            ),
            dry_run: config.dry_run,
            interval: config.poll_interval(),
            cycle: CycleId::default(),
            blocked: None,
        }
    }

    /// Initial fetch before the first cycle. Unlike a cycle fetch, a failure
    /// here is returned to the caller.
    pub async fn seed(&mut self) -> Result<usize> {
        let orders = self.source.fetch_open_orders().await?;
        self.mirror.replace_with(orders);
        tracing::info!(
            buys = self.mirror.buy_count(),
            sells = self.mirror.sell_count(),
            "Mirror seeded"
        );
        Ok(self.mirror.len())
    }

    pub fn mirror(&self) -> &OrderMirror {
        &self.mirror
    }

    pub fn quarantine(&self) -> &SubmissionQuarantine {
        &self.quarantine
    }

    /// Id of the last cycle run; `cycle:0` before the first.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Consecutive cycles in which the same top-ranked pair failed the
    /// execution checks. While non-zero, lower-ranked pairs are not tried.
    pub fn blocked_cycles(&self) -> u32 {
        self.blocked.map_or(0, |(_, n)| n)
    }

    /// Run cycles forever, sleeping `interval` between them.
    pub async fn run(&mut self) {
        tracing::info!(
            dry_run = self.dry_run,
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            quarantine_secs = self.quarantine.window().as_secs(),
            "Poll loop started"
        );
        loop {
            let outcome = self.run_cycle().await;
            tracing::debug!(cycle = %self.cycle, outcome = outcome.label(), "Cycle finished");
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One full cycle. Never returns an error; failures become outcomes.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycle = self.cycle.next();
        let cycle = self.cycle;

        match self.source.fetch_open_orders().await {
            Ok(orders) => {
                self.mirror.replace_with(orders);
                tracing::debug!(
                    %cycle,
                    buys = self.mirror.buy_count(),
                    sells = self.mirror.sell_count(),
                    "Mirror rebuilt"
                );
            }
            Err(error) => {
                tracing::error!(
                    %cycle,
                    error = %error,
                    transient = error.is_transient(),
                    "Failed to fetch orders; keeping previous snapshot"
                );
                return CycleOutcome::Failed {
                    stage: FailureStage::Fetch,
                    error,
                };
            }
        }

        let Some(m) = select_match(&self.mirror) else {
            self.blocked = None;
            tracing::debug!(%cycle, "No crossing orders");
            return CycleOutcome::NoMatch;
        };
        self.log_match(cycle, &m);
        let fingerprint = MatchFingerprint::of(&m);

        if let Err(error) = check_in_mirror(&m, &self.mirror) {
            let consecutive = match self.blocked {
                Some((prev, n)) if prev == fingerprint => n.saturating_add(1),
                _ => 1,
            };
            self.blocked = Some((fingerprint, consecutive));
            tracing::warn!(%cycle, %m, error = %error, consecutive, "Match fails execution checks; not submitting");
            if consecutive == 2 {
                tracing::warn!(
                    %cycle,
                    maker = %m.maker_id,
                    taker = %m.taker_id,
                    "Book blocked: top crossing pair keeps failing checks; lower-ranked pairs are not tried"
                );
            }
            return CycleOutcome::Rejected { m, error };
        }
        if let Some((_, n)) = self.blocked.take() {
            tracing::info!(%cycle, blocked_cycles = n, "Book unblocked");
        }

        if self.dry_run {
            tracing::info!(%cycle, %m, "DRY_RUN match");
            return CycleOutcome::Reported(m);
        }

        let now = Instant::now();
        self.quarantine.prune(now);
        if let Err(error) = self.quarantine.check(&fingerprint, now) {
            tracing::info!(
                %cycle,
                %m,
                fingerprint = %fingerprint.short(),
                error = %error,
                "Match already submitted recently; skipping"
            );
            return CycleOutcome::Quarantined(m);
        }
        // Recorded before the attempt so an uncertain outcome is not retried.
        self.quarantine.record(fingerprint, now);

        tracing::info!(%cycle, %m, fingerprint = %fingerprint.short(), "Submitting execute");
        match self.submitter.submit(&m).await {
            Ok(receipt) => {
                tracing::info!(%cycle, %m, tx = %receipt.tx_hash, "Execute accepted");
                CycleOutcome::Submitted { m, receipt }
            }
            Err(error) => {
                tracing::error!(
                    %cycle,
                    %m,
                    error = %error,
                    transient = error.is_transient(),
                    "Execute failed"
                );
                CycleOutcome::Failed {
                    stage: FailureStage::Submit,
                    error,
                }
            }
        }
    }

    fn log_match(&self, cycle: CycleId, m: &Match) {
        let price_of = |id| {
            self.mirror
                .get(id)
                .and_then(|o| o.price.approx_decimal())
                .map_or_else(|| "?".to_string(), |d| d.to_string())
        };
        tracing::info!(
            %cycle,
            maker = %m.maker_id,
            taker = %m.taker_id,
            base_fill = %m.base_fill,
            quote_paid = %m.quote_paid,
            ask = %price_of(m.maker_id),
            bid = %price_of(m.taker_id),
            "Match found"
        );
    }
}
