//! Operator decisions that gate startup.
//!
//! Only bootstrap asks these questions; the claim loop never does.

use alloy::primitives::Address;
use std::io::{self, BufRead, Write};

use crate::domain::{NetworkInfo, NETWORKS};
use crate::strategy::cost::{format_eth, FundsCheck};

pub trait Operator: Send + Sync {
    /// Is this the wallet the operator expects?
    fn confirm_address(&self, address: Address) -> bool;

    /// Key of the network to switch to, or `None` to keep `current`
    fn choose_network(&self, current: &NetworkInfo) -> Option<String>;

    /// Contract address for a network that has none configured
    fn provide_contract_address(&self, network: &NetworkInfo) -> Option<String>;

    /// Continue even though the balance is low or unreadable?
    fn confirm_low_balance(&self, check: Option<&FundsCheck>) -> bool;
}

/// Answers every question the same way. Used for `--yes` and in tests.
#[derive(Debug, Clone, Default)]
pub struct AutoOperator {
    pub approve: bool,
    pub network: Option<String>,
    pub contract_address: Option<String>,
}

impl AutoOperator {
    pub fn approving() -> Self {
        Self {
            approve: true,
            ..Default::default()
        }
    }
}

impl Operator for AutoOperator {
    fn confirm_address(&self, _address: Address) -> bool {
        self.approve
    }

    fn choose_network(&self, _current: &NetworkInfo) -> Option<String> {
        self.network.clone()
    }

    fn provide_contract_address(&self, _network: &NetworkInfo) -> Option<String> {
        self.contract_address.clone()
    }

    fn confirm_low_balance(&self, _check: Option<&FundsCheck>) -> bool {
        self.approve
    }
}

/// Interactive prompts on stdin/stdout
#[derive(Debug, Clone, Default)]
pub struct TerminalOperator;

impl TerminalOperator {
    fn ask(&self, prompt: &str) -> String {
        print!("{prompt}");
        io::stdout().flush().ok();
        let mut input = String::new();
        io::stdin().lock().read_line(&mut input).ok();
        input.trim().to_string()
    }

    fn confirm(&self, prompt: &str) -> bool {
        is_yes(&self.ask(&format!("{prompt} [y/N] ")))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl Operator for TerminalOperator {
    fn confirm_address(&self, address: Address) -> bool {
        println!("\nWallet address: {address}");
        self.confirm("Is this the wallet you expect?")
    }

    fn choose_network(&self, current: &NetworkInfo) -> Option<String> {
        if !self.confirm(&format!("\nCurrent network is {current}. Switch network?")) {
            return None;
        }
        let keys: Vec<&str> = NETWORKS.iter().map(|n| n.key).collect();
        println!("Available networks: {}", keys.join(", "));
        let answer = self.ask("Network to switch to: ");
        if answer.is_empty() {
            None
        } else {
            Some(answer)
        }
    }

    fn provide_contract_address(&self, network: &NetworkInfo) -> Option<String> {
        println!("\nNo claim contract configured for {}", network.name);
        let answer = self.ask("Contract address (leave empty to cancel): ");
        if answer.is_empty() {
            None
        } else {
            Some(answer)
        }
    }

    fn confirm_low_balance(&self, check: Option<&FundsCheck>) -> bool {
        match check {
            Some(check) => println!(
                "\nBalance {} is below the {} needed for one claim.",
                format_eth(check.estimate.balance),
                format_eth(check.estimate.unit_cost)
            ),
            None => println!("\nWallet balance could not be read."),
        }
        self.confirm("Continue anyway?")
    }
}
