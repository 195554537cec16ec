pub mod claimer;
pub mod cost;
pub mod endpoint;
pub mod submitter;

pub use claimer::{AutoClaimer, ClaimerConfig, CyclePhase, CycleReport};
pub use cost::{
    affordable_count, BalanceReader, BalanceStrategy, CostEstimate, CostEstimator, FundsCheck,
    GasPolicy,
};
pub use endpoint::{EndpointSelector, SelectedEndpoint};
pub use submitter::ClaimSubmitter;
