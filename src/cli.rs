use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reward-claimer")]
#[command(author = "Reward Claimer Team")]
#[command(version = "0.1.0")]
#[command(about = "Unattended on-chain reward claimer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and per-environment overrides
    #[arg(short, long, default_value = "config")]
    pub config: PathBuf,

    /// Network key, overrides the configured network
    #[arg(short, long, env = "CLAIMER_NETWORK")]
    pub network: Option<String>,

    /// Answer yes to every startup prompt
    #[arg(short, long, default_value = "false")]
    pub yes: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Claim on a fixed interval until interrupted (default)
    Run {
        /// Seconds between the end of one cycle and the start of the next
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Run a single claim cycle and exit
    Once,
    /// Show balance, affordability and pending rewards without claiming
    Check,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run { interval: None })
    }
}
