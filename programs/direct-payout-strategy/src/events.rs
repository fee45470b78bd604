use anchor_lang::prelude::*;

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyInitialized {
    pub strategy: Pubkey,
    pub round: Pubkey,
    pub settings: Pubkey,
    pub vault: Pubkey,
    pub round_fee_percentage: u32,
    pub round_fee_address: Pubkey,
    pub version: [u8; 3],
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct RoundFeePercentageUpdated {
    pub round_fee_percentage: u32,
}

#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct RoundFeeAddressUpdated {
    pub round_fee_address: Pubkey,
}

/// Audit record for every completed transfer. `allowance_module` is the
/// default key when the direct vault path moved the funds.
#[event]
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutMade {
    pub vault: Pubkey,
    pub token: Pubkey,
    pub amount: u64,
    pub grant_address: Pubkey,
    pub project_id: [u8; 32],
    pub application_index: u64,
    pub allowance_module: Pubkey,
}
