//! Auto-claimer for signed block rewards
//!
//! One cycle lists unclaimed rewards, bounds the batch by what the wallet
//! can pay for, and claims entries one at a time:
//!
//! `CheckingFunds -> Listing -> (NoEntries | Processing) -> Done`
//!
//! Nothing carries over between cycles except the network context.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::adapters::RewardSource;
use crate::domain::{ClaimOutcome, NetworkContext, RewardEntry};
use crate::error::Result;
use crate::strategy::cost::{format_eth, CostEstimator, FundsCheck};
use crate::strategy::submitter::ClaimSubmitter;

/// Cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    CheckingFunds,
    Listing,
    NoEntries,
    Processing,
    Done,
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CyclePhase::CheckingFunds => write!(f, "checking_funds"),
            CyclePhase::Listing => write!(f, "listing"),
            CyclePhase::NoEntries => write!(f, "no_entries"),
            CyclePhase::Processing => write!(f, "processing"),
            CyclePhase::Done => write!(f, "done"),
        }
    }
}

/// What happened during one cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Every phase entered, in order
    pub phases: Vec<CyclePhase>,
    pub listed: usize,
    pub to_process: usize,
    /// Claim submissions made
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Entries skipped for lack of an authorization
    pub skipped: usize,
    /// Listed entries never looked at this cycle
    pub remaining: usize,
    /// Funds, not availability, bounded the cycle
    pub funds_limited: bool,
    pub outcomes: Vec<ClaimOutcome>,
}

impl Default for CycleReport {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleReport {
    pub fn new() -> Self {
        Self {
            phases: vec![CyclePhase::CheckingFunds],
            listed: 0,
            to_process: 0,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            remaining: 0,
            funds_limited: false,
            outcomes: Vec::new(),
        }
    }

    fn enter(&mut self, phase: CyclePhase) {
        debug!("Cycle phase -> {}", phase);
        self.phases.push(phase);
    }

    pub fn phase(&self) -> CyclePhase {
        self.phases.last().copied().unwrap_or(CyclePhase::CheckingFunds)
    }
}

/// Auto-claimer configuration
#[derive(Debug, Clone)]
pub struct ClaimerConfig {
    /// Pause after each submission before the next one
    pub item_delay: Duration,
}

impl Default for ClaimerConfig {
    fn default() -> Self {
        Self {
            item_delay: Duration::from_secs(3),
        }
    }
}

/// Batch processor: runs claim cycles against one network context
pub struct AutoClaimer {
    ctx: NetworkContext,
    source: Arc<dyn RewardSource>,
    estimator: CostEstimator,
    submitter: ClaimSubmitter,
    config: ClaimerConfig,
}

impl AutoClaimer {
    /// Create a new auto-claimer
    pub fn new(
        ctx: NetworkContext,
        source: Arc<dyn RewardSource>,
        estimator: CostEstimator,
        config: ClaimerConfig,
    ) -> Self {
        let submitter = ClaimSubmitter::new(*estimator.policy());
        Self {
            ctx,
            source,
            estimator,
            submitter,
            config,
        }
    }

    pub fn context(&self) -> &NetworkContext {
        &self.ctx
    }

    /// Run one full cycle. Per-entry failures are contained here.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let mut report = CycleReport::new();
        let currency = self.ctx.network.native_currency;

        let check = match self.funds_check().await {
            Some(check) if check.sufficient => check,
            Some(check) => {
                info!(
                    "Balance {} {} below one claim ({} {}), skipping cycle",
                    format_eth(check.estimate.balance),
                    currency,
                    format_eth(check.estimate.unit_cost),
                    currency
                );
                report.funds_limited = true;
                report.enter(CyclePhase::Done);
                return Ok(report);
            }
            None => {
                report.funds_limited = true;
                report.enter(CyclePhase::Done);
                return Ok(report);
            }
        };

        report.enter(CyclePhase::Listing);
        info!("Checking for unclaimed rewards...");
        let entries = self.source.list_unclaimed(self.ctx.wallet).await;
        report.listed = entries.len();

        if entries.is_empty() {
            info!("No unclaimed rewards");
            report.enter(CyclePhase::NoEntries);
            report.enter(CyclePhase::Done);
            return Ok(report);
        }
        info!("Found {} unclaimed reward(s)", entries.len());

        report.enter(CyclePhase::Processing);
        let affordable = usize::try_from(check.estimate.affordable_count).unwrap_or(usize::MAX);
        report.to_process = entries.len().min(affordable);
        report.funds_limited = report.to_process < entries.len();

        if report.to_process == 0 {
            error!(
                "Balance cannot cover any claim, add more {} to continue",
                currency
            );
            report.remaining = entries.len();
            report.enter(CyclePhase::Done);
            return Ok(report);
        }

        info!(
            "Balance allows {} claim(s); processing {} of {}",
            check.estimate.affordable_count,
            report.to_process,
            entries.len()
        );

        let examined = self.process_entries(&entries, &mut report).await;
        report.remaining = entries.len() - examined;
        report.enter(CyclePhase::Done);

        info!(
            "Cycle done: {} claimed, {} failed, {} skipped",
            report.succeeded, report.failed, report.skipped
        );
        if report.remaining > 0 {
            if report.funds_limited {
                warn!(
                    "{} reward(s) left unprocessed, add more {} to claim them",
                    report.remaining, currency
                );
            } else {
                info!("{} reward(s) left for the next cycle", report.remaining);
            }
        }

        Ok(report)
    }

    /// Claims entries in order until the budget is spent. Returns how many
    /// entries were looked at.
    async fn process_entries(&self, entries: &[RewardEntry], report: &mut CycleReport) -> usize {
        let mut examined = 0;

        for (i, entry) in entries.iter().enumerate() {
            if report.attempted >= report.to_process {
                break;
            }

            info!(
                "Processing reward {}/{}: id {}",
                report.attempted + 1,
                report.to_process,
                entry.id
            );

            let Some(authorization) = self
                .source
                .get_authorization(self.ctx.wallet, &entry.hash)
                .await
            else {
                warn!("Skipping reward {}, no signature available", entry.id);
                report.skipped += 1;
                examined = i + 1;
                continue;
            };

            // Balance may have moved since the cycle started
            let observed_balance = match self.funds_check().await {
                Some(check) if check.sufficient => check.estimate.balance,
                _ => {
                    warn!("Balance no longer covers a claim, stopping this cycle");
                    report.funds_limited = true;
                    return examined;
                }
            };

            report.attempted += 1;
            examined = i + 1;
            let outcome = self
                .submitter
                .submit(&self.ctx, entry, &authorization, observed_balance)
                .await;

            if outcome.succeeded {
                report.succeeded += 1;
                info!("Claimed reward {}", entry.id);
            } else {
                report.failed += 1;
                warn!(
                    "Failed to claim reward {}: {}",
                    entry.id,
                    outcome.reason.as_deref().unwrap_or("unknown error")
                );
            }

            let funds_failure = outcome.is_funds_failure();
            report.outcomes.push(outcome);
            if funds_failure {
                warn!("Network reported insufficient funds, stopping this cycle");
                report.funds_limited = true;
                return examined;
            }

            let more_to_do = report.attempted < report.to_process && i + 1 < entries.len();
            if more_to_do && !self.config.item_delay.is_zero() {
                tokio::time::sleep(self.config.item_delay).await;
            }
        }

        examined
    }

    /// Quiet funds check; `None` when the balance could not be read
    async fn funds_check(&self) -> Option<FundsCheck> {
        match self.estimator.estimate_and_check(&self.ctx, false).await {
            Ok(check) => Some(check),
            Err(e) => {
                warn!("Funds check failed, treating as insufficient: {}", e);
                None
            }
        }
    }

    /// Report funds and list rewards without claiming anything
    pub async fn preview(&self) -> Result<(FundsCheck, Vec<RewardEntry>)> {
        let check = self.estimator.estimate_and_check(&self.ctx, true).await?;
        let entries = self.source.list_unclaimed(self.ctx.wallet).await;
        Ok((check, entries))
    }
}
