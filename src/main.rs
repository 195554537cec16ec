use clap::Parser;
use reward_claimer::cli::{Cli, Commands};
use reward_claimer::config::{AppConfig, LoggingConfig};
use reward_claimer::error::ClaimError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod main_modes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    if let Some(network) = &cli.network {
        config.network = network.clone();
    }

    let command = cli.command();
    if let Commands::Run { interval: Some(secs) } = command {
        config.schedule.interval_secs = secs;
    }

    init_logging(&config.logging);

    if let Err(problems) = config.validate() {
        for problem in &problems {
            error!("Invalid configuration: {}", problem);
        }
        return Err(ClaimError::InvalidConfig(problems.join("; ")).into());
    }

    let result = match command {
        Commands::Run { .. } => main_modes::run_scheduled(&config, cli.yes).await,
        Commands::Once => main_modes::run_once(&config, cli.yes).await,
        Commands::Check => main_modes::run_check(&config, cli.yes).await,
    };

    match result {
        Ok(()) => Ok(()),
        Err(ClaimError::Aborted(reason)) => {
            info!("Cancelled: {}", reason);
            Ok(())
        }
        Err(e) => {
            error!("Fatal: {}", e);
            Err(e.into())
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},reward_claimer=debug", logging.level))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
