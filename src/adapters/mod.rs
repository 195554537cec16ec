pub mod chain;
pub mod reward_api;

pub use chain::{
    AlloyChainClient, AlloyConnector, ChainClient, ChainConnector, ClaimReceipt, ClaimRequest,
};
pub use reward_api::{HttpRewardSource, RewardSource};
