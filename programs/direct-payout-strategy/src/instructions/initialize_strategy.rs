use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::DirectStrategyError,
    state::{load_settings, DirectStrategy, StrategyInitParams},
};

#[derive(Accounts)]
pub struct InitializeStrategy<'info> {
    /// Created on first use; a second call finds it initialized and fails
    #[account(
        init_if_needed,
        payer = payer,
        space = DirectStrategy::LEN,
        seeds = [STRATEGY_SEED, round.key().as_ref()],
        bump
    )]
    pub strategy: Account<'info, DirectStrategy>,

    /// PDA holding the vault token approvals used by direct payouts
    /// CHECK: derived and used as authority only
    #[account(
        seeds = [STRATEGY_AUTHORITY_SEED, strategy.key().as_ref()],
        bump
    )]
    pub strategy_authority: AccountInfo<'info>,

    /// The round creating its strategy; becomes the strategy's round.
    /// Must be owned by the round program, checked by load_round.
    pub round: Signer<'info>,

    /// Settings registry named in the init params
    /// CHECK: owner and layout checked by load_settings, key checked against params
    pub settings: AccountInfo<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_strategy(
    ctx: Context<InitializeStrategy>,
    encoded_params: Vec<u8>,
) -> Result<()> {
    let params = StrategyInitParams::decode(&encoded_params)?;
    require_keys_eq!(
        ctx.accounts.settings.key(),
        params.settings,
        DirectStrategyError::InvalidSettingsAccount
    );
    let settings = load_settings(&ctx.accounts.settings)?;

    let strategy_key = ctx.accounts.strategy.key();
    let round_key = ctx.accounts.round.key();
    let strategy = &mut ctx.accounts.strategy;

    let event =
        strategy.initialize_for_round(strategy_key, &ctx.accounts.round, params, &settings)?;
    strategy.authority_bump = ctx.bumps.strategy_authority;
    strategy.bump = ctx.bumps.strategy;

    msg!("direct strategy initialized for round {}", round_key);
    emit!(event);

    Ok(())
}
