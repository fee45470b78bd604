use anchor_lang::prelude::*;

use crate::{
    allowance_integration,
    constants::*,
    errors::DirectStrategyError,
    state::DirectStrategy,
};

#[derive(Accounts)]
pub struct GenerateTransferHash<'info> {
    #[account(
        seeds = [STRATEGY_SEED, strategy.round.as_ref()],
        bump = strategy.bump,
        constraint = strategy.is_initialized @ DirectStrategyError::NotInitialized
    )]
    pub strategy: Account<'info, DirectStrategy>,

    /// Allowance PDA of the delegate for `token`; supplies the current nonce
    /// CHECK: PDA derivation checked by read_token_allowance
    pub allowance: UncheckedAccount<'info>,
}

/// Hash a delegate signs to authorize a payout of `amount` of `token` to `to`
/// from the strategy vault, at the allowance's current nonce.
pub fn generate_transfer_hash(
    ctx: Context<GenerateTransferHash>,
    allowance_module: Pubkey,
    delegate: [u8; 20],
    token: Pubkey,
    to: Pubkey,
    amount: u64,
) -> Result<[u8; 32]> {
    let vault = ctx.accounts.strategy.vault;
    let allowance = allowance_integration::read_token_allowance(
        &ctx.accounts.allowance,
        &allowance_module,
        &vault,
        &delegate,
        &token,
    )?;

    Ok(allowance_integration::generate_transfer_hash(
        &allowance_module,
        &vault,
        &delegate,
        &token,
        &to,
        amount,
        allowance.nonce,
    ))
}
