use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::DirectStrategyError,
    state::{load_round, load_settings, DirectStrategy},
};

#[derive(Accounts)]
pub struct UpdateRoundFee<'info> {
    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.round.as_ref()],
        bump = strategy.bump,
        constraint = strategy.is_initialized @ DirectStrategyError::NotInitialized
    )]
    pub strategy: Account<'info, DirectStrategy>,

    /// CHECK: must be the strategy's round; owner and layout checked by load_round
    #[account(address = strategy.round @ DirectStrategyError::InvalidRoundAccount)]
    pub round: AccountInfo<'info>,

    /// CHECK: must be the strategy's settings; owner and layout checked by load_settings
    #[account(address = strategy.settings @ DirectStrategyError::InvalidSettingsAccount)]
    pub settings: AccountInfo<'info>,

    pub operator: Signer<'info>,
}

pub fn update_round_fee_percentage(
    ctx: Context<UpdateRoundFee>,
    new_percentage: u32,
) -> Result<()> {
    let round = load_round(&ctx.accounts.round)?;
    let settings = load_settings(&ctx.accounts.settings)?;
    let now = Clock::get()?.unix_timestamp;
    let operator = ctx.accounts.operator.key();

    let event = ctx
        .accounts
        .strategy
        .update_round_fee_percentage(&round, &settings, &operator, now, new_percentage)?;

    msg!("round fee percentage set to {}", new_percentage);
    emit!(event);

    Ok(())
}

pub fn update_round_fee_address(ctx: Context<UpdateRoundFee>, new_address: Pubkey) -> Result<()> {
    let round = load_round(&ctx.accounts.round)?;
    let now = Clock::get()?.unix_timestamp;
    let operator = ctx.accounts.operator.key();

    let event = ctx
        .accounts
        .strategy
        .update_round_fee_address(&round, &operator, now, new_address)?;

    msg!("round fee address set to {}", new_address);
    emit!(event);

    Ok(())
}
