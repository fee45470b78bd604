use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::DirectStrategyError,
    state::{load_settings, DirectStrategy, FeeQuote},
};

#[derive(Accounts)]
pub struct QuoteFees<'info> {
    #[account(
        seeds = [STRATEGY_SEED, strategy.round.as_ref()],
        bump = strategy.bump,
        constraint = strategy.is_initialized @ DirectStrategyError::NotInitialized
    )]
    pub strategy: Account<'info, DirectStrategy>,

    /// CHECK: must be the strategy's settings; owner and layout checked by load_settings
    #[account(address = strategy.settings @ DirectStrategyError::InvalidSettingsAccount)]
    pub settings: AccountInfo<'info>,
}

pub fn quote_fees(ctx: Context<QuoteFees>, amount: u64) -> Result<FeeQuote> {
    let settings = load_settings(&ctx.accounts.settings)?;
    ctx.accounts.strategy.quote_fees(&settings, amount)
}
