pub mod adapters;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod signing;
pub mod strategy;

pub use config::AppConfig;
pub use coordination::{ClaimScheduler, SchedulerHandle};
pub use error::{ClaimError, Result};
pub use signing::Wallet;
pub use strategy::{AutoClaimer, CycleReport};
