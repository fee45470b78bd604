use anchor_lang::prelude::*;

use crate::{constants::*, errors::DirectStrategyError, state::DirectStrategy};

#[derive(Accounts)]
pub struct Vote<'info> {
    #[account(
        seeds = [STRATEGY_SEED, strategy.round.as_ref()],
        bump = strategy.bump,
        constraint = strategy.is_initialized @ DirectStrategyError::NotInitialized
    )]
    pub strategy: Account<'info, DirectStrategy>,

    #[account(address = strategy.round @ DirectStrategyError::InvalidRoundAccount)]
    pub round: Signer<'info>,
}

pub fn vote(ctx: Context<Vote>, encoded_votes: Vec<Vec<u8>>) -> Result<()> {
    ctx.accounts.strategy.vote(&encoded_votes)
}
