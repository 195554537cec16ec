//! Coordination layer
//!
//! - Startup bootstrap and the operator prompts that gate it
//! - The claim scheduler and its shutdown handle

pub mod bootstrap;
pub mod operator;
pub mod scheduler;

pub use bootstrap::bootstrap;
pub use operator::{AutoOperator, Operator, TerminalOperator};
pub use scheduler::{ClaimCycle, ClaimScheduler, SchedulerHandle};
