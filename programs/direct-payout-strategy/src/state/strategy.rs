use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::DirectStrategyError,
    events::{RoundFeeAddressUpdated, RoundFeePercentageUpdated, StrategyInitialized},
    state::{load_round, RoundState, SettingsRegistry},
};

/// One-time parameters the round hands over when it creates its strategy
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct StrategyInitParams {
    pub settings: Pubkey,
    pub vault: Pubkey,
    pub round_fee_percentage: u32,
    pub round_fee_address: Pubkey,
}

impl StrategyInitParams {
    pub fn decode(encoded: &[u8]) -> Result<Self> {
        Self::try_from_slice(encoded).map_err(|_| error!(DirectStrategyError::InvalidInitParams))
    }
}

/// Fees attributable to a payout amount. Payouts move the full amount;
/// this is reported for off-chain reconciliation.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct FeeQuote {
    pub amount: u64,
    pub protocol_fee: u64,
    pub protocol_treasury: Pubkey,
    pub round_fee: u64,
    pub round_fee_address: Pubkey,
}

#[account]
#[derive(Default, Debug)]
pub struct DirectStrategy {
    /// Round that initialized this strategy
    pub round: Pubkey,

    /// Settings registry holding the protocol fee and trusted registries
    pub settings: Pubkey,

    /// Vault the allowance module pulls from on the delegated path
    pub vault: Pubkey,

    /// Round fee over DENOMINATOR
    pub round_fee_percentage: u32,

    /// Round fee recipient
    pub round_fee_address: Pubkey,

    pub version: [u8; 3],

    pub is_initialized: bool,

    /// Bump of the strategy authority PDA (SPL delegate on vault token accounts)
    pub authority_bump: u8,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Reserved space for future upgrades
    pub _reserved: [u8; 32],
}

impl DirectStrategy {
    pub const LEN: usize = 8 + // discriminator
        32 + // round
        32 + // settings
        32 + // vault
        4 + // round_fee_percentage
        32 + // round_fee_address
        3 + // version
        1 + // is_initialized
        1 + // authority_bump
        1 + // bump
        32; // _reserved

    /// Initialize on behalf of `round`, which must be a live account of the
    /// round program. Any other signer is rejected before state changes.
    pub fn initialize_for_round(
        &mut self,
        strategy: Pubkey,
        round: &AccountInfo,
        params: StrategyInitParams,
        settings: &impl SettingsRegistry,
    ) -> Result<StrategyInitialized> {
        load_round(round)?;
        self.initialize(strategy, round.key(), params, settings)
    }

    pub fn initialize(
        &mut self,
        strategy: Pubkey,
        round: Pubkey,
        params: StrategyInitParams,
        settings: &impl SettingsRegistry,
    ) -> Result<StrategyInitialized> {
        require!(!self.is_initialized, DirectStrategyError::AlreadyInitialized);
        validate_fee_percentage(params.round_fee_percentage, settings)?;

        self.round = round;
        self.settings = params.settings;
        self.vault = params.vault;
        self.round_fee_percentage = params.round_fee_percentage;
        self.round_fee_address = params.round_fee_address;
        self.version = VERSION;
        self.is_initialized = true;

        Ok(StrategyInitialized {
            strategy,
            round,
            settings: params.settings,
            vault: params.vault,
            round_fee_percentage: params.round_fee_percentage,
            round_fee_address: params.round_fee_address,
            version: VERSION,
        })
    }

    pub fn update_round_fee_percentage(
        &mut self,
        round: &impl RoundState,
        settings: &impl SettingsRegistry,
        caller: &Pubkey,
        now: i64,
        new_percentage: u32,
    ) -> Result<RoundFeePercentageUpdated> {
        self.ensure_round_config_window(round, caller, now)?;
        validate_fee_percentage(new_percentage, settings)?;

        self.round_fee_percentage = new_percentage;

        Ok(RoundFeePercentageUpdated {
            round_fee_percentage: new_percentage,
        })
    }

    pub fn update_round_fee_address(
        &mut self,
        round: &impl RoundState,
        caller: &Pubkey,
        now: i64,
        new_address: Pubkey,
    ) -> Result<RoundFeeAddressUpdated> {
        self.ensure_round_config_window(round, caller, now)?;

        self.round_fee_address = new_address;

        Ok(RoundFeeAddressUpdated {
            round_fee_address: new_address,
        })
    }

    pub fn quote_fees(&self, settings: &impl SettingsRegistry, amount: u64) -> Result<FeeQuote> {
        Ok(FeeQuote {
            amount,
            protocol_fee: fee_of(amount, settings.protocol_fee_percentage())?,
            protocol_treasury: settings.protocol_treasury(),
            round_fee: fee_of(amount, self.round_fee_percentage)?,
            round_fee_address: self.round_fee_address,
        })
    }

    /// Direct grants are paid by operators, not tallied; every vote is rejected.
    pub fn vote(&self, _encoded_votes: &[Vec<u8>]) -> Result<()> {
        err!(DirectStrategyError::VoteNotImplemented)
    }

    fn ensure_round_config_window(
        &self,
        round: &impl RoundState,
        caller: &Pubkey,
        now: i64,
    ) -> Result<()> {
        require!(self.is_initialized, DirectStrategyError::NotInitialized);
        require!(round.is_round_operator(caller), DirectStrategyError::NotRoundOperator);
        require!(now < round.round_end_time(), DirectStrategyError::RoundEnded);
        Ok(())
    }
}

fn validate_fee_percentage(
    round_fee_percentage: u32,
    settings: &impl SettingsRegistry,
) -> Result<()> {
    let total = (round_fee_percentage as u64) + (settings.protocol_fee_percentage() as u64);
    require!(total <= DENOMINATOR as u64, DirectStrategyError::InvalidFeePercentage);
    Ok(())
}

fn fee_of(amount: u64, percentage: u32) -> Result<u64> {
    let fee = (amount as u128)
        .checked_mul(percentage as u128)
        .ok_or(DirectStrategyError::MathOverflow)?
        .checked_div(DENOMINATOR as u128)
        .ok_or(DirectStrategyError::MathOverflow)?;
    u64::try_from(fee).map_err(|_| error!(DirectStrategyError::MathOverflow))
}
