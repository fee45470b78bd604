use anchor_lang::prelude::*;

pub mod allowance_integration;
pub mod constants;
pub mod disbursement;
pub mod errors;
pub mod events;
pub mod fund_source;
pub mod instructions;
pub mod state;

#[cfg(test)]
mod test_utils;

use fund_source::PaymentRequest;
use instructions::*;
use state::FeeQuote;

declare_id!("DirectPayout1111111111111111111111111111111");

#[program]
pub mod direct_payout_strategy {
    use super::*;

    /// Bind a new strategy to the calling round. `encoded_params` is the
    /// borsh encoding of `StrategyInitParams`.
    pub fn initialize(ctx: Context<InitializeStrategy>, encoded_params: Vec<u8>) -> Result<()> {
        instructions::initialize_strategy(ctx, encoded_params)
    }

    /// Round operator only, before the round ends
    pub fn update_round_fee_percentage(
        ctx: Context<UpdateRoundFee>,
        new_percentage: u32,
    ) -> Result<()> {
        instructions::update_round_fee_percentage(ctx, new_percentage)
    }

    /// Round operator only, before the round ends
    pub fn update_round_fee_address(
        ctx: Context<UpdateRoundFee>,
        new_address: Pubkey,
    ) -> Result<()> {
        instructions::update_round_fee_address(ctx, new_address)
    }

    /// Pay an accepted application from the vault or through an allowance module
    pub fn payout<'info>(
        ctx: Context<'_, '_, '_, 'info, Payout<'info>>,
        request: PaymentRequest,
    ) -> Result<()> {
        instructions::payout(ctx, request)
    }

    pub fn generate_transfer_hash(
        ctx: Context<GenerateTransferHash>,
        allowance_module: Pubkey,
        delegate: [u8; 20],
        token: Pubkey,
        to: Pubkey,
        amount: u64,
    ) -> Result<[u8; 32]> {
        instructions::generate_transfer_hash(ctx, allowance_module, delegate, token, to, amount)
    }

    /// Protocol and round fees that apply to `amount` under current settings
    pub fn quote_fees(ctx: Context<QuoteFees>, amount: u64) -> Result<FeeQuote> {
        instructions::quote_fees(ctx, amount)
    }

    /// Always rejected: direct payouts have no voting phase
    pub fn vote(ctx: Context<Vote>, encoded_votes: Vec<Vec<u8>>) -> Result<()> {
        instructions::vote(ctx, encoded_votes)
    }
}
