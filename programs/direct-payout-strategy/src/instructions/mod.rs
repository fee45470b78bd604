pub mod initialize_strategy;
pub mod update_round_fee;
pub mod payout;
pub mod transfer_hash;
pub mod quote_fees;
pub mod vote;

pub use initialize_strategy::*;
pub use update_round_fee::*;
pub use payout::*;
pub use transfer_hash::*;
pub use quote_fees::*;
pub use vote::*;
