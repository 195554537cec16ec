pub mod network;
pub mod reward;

pub use network::*;
pub use reward::*;
