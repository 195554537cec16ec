use reward_claimer::adapters::{AlloyConnector, HttpRewardSource};
use reward_claimer::config::AppConfig;
use reward_claimer::coordination::{
    bootstrap, AutoOperator, ClaimScheduler, Operator, TerminalOperator,
};
use reward_claimer::error::Result;
use reward_claimer::signing::Wallet;
use reward_claimer::strategy::cost::{format_eth, format_gwei};
use reward_claimer::strategy::AutoClaimer;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

fn operator(yes: bool) -> Box<dyn Operator> {
    if yes {
        Box::new(AutoOperator::approving())
    } else {
        Box::new(TerminalOperator)
    }
}

async fn start(config: &AppConfig, yes: bool) -> Result<AutoClaimer> {
    let wallet = Wallet::from_env()?;
    let connector = Arc::new(AlloyConnector::new(wallet.ethereum_wallet()));
    let source = Arc::new(HttpRewardSource::new(&config.api)?);
    let operator = operator(yes);

    bootstrap(config, wallet.address(), connector, source, operator.as_ref()).await
}

/// Claim forever on the configured interval until Ctrl-C / SIGTERM
pub async fn run_scheduled(config: &AppConfig, yes: bool) -> Result<()> {
    let claimer = start(config, yes).await?;
    let interval = config.schedule.interval();

    info!(
        "Starting auto-claimer on {} (interval={}s, item delay={}ms)",
        claimer.context().network.name,
        interval.as_secs(),
        config.schedule.item_delay_ms
    );

    let handle = ClaimScheduler::new(Arc::new(claimer), interval).spawn();

    shutdown_signal().await;
    info!("Shutdown requested, waiting for the current cycle to finish...");
    let completed = handle.shutdown().await;
    info!("Auto-claimer stopped after {} cycle(s)", completed);
    Ok(())
}

/// One cycle, then exit
pub async fn run_once(config: &AppConfig, yes: bool) -> Result<()> {
    let claimer = start(config, yes).await?;
    let report = claimer.run_cycle().await?;

    for outcome in &report.outcomes {
        match (&outcome.tx_reference, outcome.succeeded) {
            (Some(tx), true) => info!(
                "✅ Claimed {}... | {}",
                outcome.entry.short_hash(),
                claimer.context().network.tx_url(*tx)
            ),
            _ => error!(
                "❌ Failed to claim {}...: {}",
                outcome.entry.short_hash(),
                outcome.reason.as_deref().unwrap_or("unknown")
            ),
        }
    }

    info!(
        "Done ({}): {} succeeded, {} failed, {} skipped, {} remaining",
        report.phase(),
        report.succeeded,
        report.failed,
        report.skipped,
        report.remaining
    );
    Ok(())
}

/// Balance, affordability and pending rewards; nothing is sent
pub async fn run_check(config: &AppConfig, yes: bool) -> Result<()> {
    let claimer = start(config, yes).await?;
    let (check, entries) = claimer.preview().await?;
    let currency = claimer.context().network.native_currency;

    info!(
        "Balance: {} {} | gas price: {} gwei (bid {} gwei) | cost per claim: {} {}",
        format_eth(check.estimate.balance),
        currency,
        format_gwei(check.estimate.network_gas_price),
        format_gwei(check.estimate.gas_price),
        format_eth(check.estimate.unit_cost),
        currency
    );
    info!("Affordable claims: {}", check.estimate.affordable_count);

    if entries.is_empty() {
        info!("No unclaimed rewards");
        return Ok(());
    }

    info!("Found {} unclaimed rewards:", entries.len());
    for entry in &entries {
        info!(
            "  • #{} {}... | observed {}",
            entry.id,
            entry.short_hash(),
            entry.observed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if (entries.len() as u64) > check.estimate.affordable_count {
        warn!(
            "Balance covers only {} of {} rewards",
            check.estimate.affordable_count,
            entries.len()
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
