use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::spl_token::state::Account as SplTokenAccount;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use spl_associated_token_account::get_associated_token_address;

use crate::{
    allowance_integration::{self, AllowanceTransfer, DelegateAddress, TokenAllowance},
    constants::*,
    disbursement,
    errors::DirectStrategyError,
    fund_source::{FundSource, PaymentRequest},
    state::{load_round, load_settings, DirectStrategy},
};

#[derive(Accounts)]
pub struct Payout<'info> {
    #[account(
        seeds = [STRATEGY_SEED, strategy.round.as_ref()],
        bump = strategy.bump,
        constraint = strategy.is_initialized @ DirectStrategyError::NotInitialized
    )]
    pub strategy: Box<Account<'info, DirectStrategy>>,

    /// SPL delegate of the vault token accounts on the direct path
    /// CHECK: PDA derivation
    #[account(
        seeds = [STRATEGY_AUTHORITY_SEED, strategy.key().as_ref()],
        bump = strategy.authority_bump
    )]
    pub strategy_authority: AccountInfo<'info>,

    /// CHECK: must be the strategy's round; owner and layout checked by load_round
    #[account(address = strategy.round @ DirectStrategyError::InvalidRoundAccount)]
    pub round: AccountInfo<'info>,

    /// CHECK: must be the strategy's settings; owner and layout checked by load_settings
    #[account(address = strategy.settings @ DirectStrategyError::InvalidSettingsAccount)]
    pub settings: AccountInfo<'info>,

    pub operator: Signer<'info>,

    /// Token account funds leave from: the direct vault's, or the safe's for
    /// SPL transfers through an allowance module
    #[account(mut)]
    pub source_token_account: Option<Box<Account<'info, TokenAccount>>>,

    /// Grantee's associated token account
    #[account(mut)]
    pub grantee_token_account: Option<Box<Account<'info, TokenAccount>>>,

    /// CHECK: must equal the requested module, which the settings registry trusts
    pub allowance_program: Option<UncheckedAccount<'info>>,

    /// CHECK: must equal the strategy vault
    #[account(mut)]
    pub safe: Option<UncheckedAccount<'info>>,

    /// CHECK: allowance PDA of the module, checked on read
    #[account(mut)]
    pub allowance: Option<UncheckedAccount<'info>>,

    /// CHECK: delegate registry PDA of the module, checked on read
    pub delegates: Option<UncheckedAccount<'info>>,

    /// CHECK: must equal the grant address
    #[account(mut)]
    pub grantee: Option<UncheckedAccount<'info>>,

    pub token_program: Program<'info, Token>,
    // Remaining accounts are forwarded to the allowance module CPI
}

pub fn payout<'info>(
    ctx: Context<'_, '_, '_, 'info, Payout<'info>>,
    request: PaymentRequest,
) -> Result<()> {
    let round = load_round(&ctx.accounts.round)?;
    let settings = load_settings(&ctx.accounts.settings)?;
    let operator = ctx.accounts.operator.key();

    let accounts = &*ctx.accounts;
    let mut funds = PayoutFundSource {
        accounts,
        remaining_accounts: ctx.remaining_accounts,
    };

    let event = disbursement::payout(
        &accounts.strategy,
        &round,
        &settings,
        &mut funds,
        &operator,
        &request,
    )?;

    msg!(
        "payout of {} to {} for application {}",
        event.amount,
        event.grant_address,
        event.application_index
    );
    emit!(event);

    Ok(())
}

/// Funding primitives backed by the accounts of a payout instruction
pub struct PayoutFundSource<'a, 'info> {
    accounts: &'a Payout<'info>,
    remaining_accounts: &'a [AccountInfo<'info>],
}

fn required<T>(account: &Option<T>) -> Result<&T> {
    account
        .as_ref()
        .ok_or_else(|| error!(DirectStrategyError::MissingFundSourceAccount))
}

/// Source and destination of an SPL transfer of `token` from `owner` to the
/// grant address `to`. The destination must be the grantee's associated
/// token account.
pub fn check_token_accounts(
    source: &SplTokenAccount,
    destination: &SplTokenAccount,
    destination_key: &Pubkey,
    owner: &Pubkey,
    token: &Pubkey,
    to: &Pubkey,
) -> Result<()> {
    require_keys_eq!(source.owner, *owner, DirectStrategyError::TokenAccountMismatch);
    require_keys_eq!(source.mint, *token, DirectStrategyError::TokenAccountMismatch);
    require_keys_eq!(destination.mint, *token, DirectStrategyError::TokenAccountMismatch);
    require_keys_eq!(
        *destination_key,
        get_associated_token_address(to, token),
        DirectStrategyError::TokenAccountMismatch
    );
    Ok(())
}

/// The vault's standing approval must name `authority` and cover `amount`.
pub fn check_vault_approval(
    source: &SplTokenAccount,
    authority: &Pubkey,
    amount: u64,
) -> Result<()> {
    let approved = if source.delegate == COption::Some(*authority) {
        source.delegated_amount
    } else {
        0
    };
    require!(approved >= amount, DirectStrategyError::InsufficientAllowance);
    require!(source.amount >= amount, DirectStrategyError::InsufficientBalance);
    Ok(())
}

impl<'a, 'info> PayoutFundSource<'a, 'info> {
    fn token_accounts(
        &self,
        owner: &Pubkey,
        token: &Pubkey,
        to: &Pubkey,
    ) -> Result<(&'a Account<'info, TokenAccount>, &'a Account<'info, TokenAccount>)> {
        let source = required(&self.accounts.source_token_account)?;
        let destination = required(&self.accounts.grantee_token_account)?;
        check_token_accounts(source, destination, &destination.key(), owner, token, to)?;

        Ok((&**source, &**destination))
    }
}

impl<'a, 'info> FundSource for PayoutFundSource<'a, 'info> {
    fn transfer_from(
        &mut self,
        vault: &Pubkey,
        token: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<()> {
        let (source, destination) = self.token_accounts(vault, token, to)?;

        check_vault_approval(source, &self.accounts.strategy_authority.key(), amount)?;

        let strategy_key = self.accounts.strategy.key();
        let bump = [self.accounts.strategy.authority_bump];
        let signer_seeds: &[&[u8]] = &[STRATEGY_AUTHORITY_SEED, strategy_key.as_ref(), &bump];

        token::transfer(
            CpiContext::new_with_signer(
                self.accounts.token_program.to_account_info(),
                Transfer {
                    from: source.to_account_info(),
                    to: destination.to_account_info(),
                    authority: self.accounts.strategy_authority.to_account_info(),
                },
                &[signer_seeds],
            ),
            amount,
        )
    }

    fn token_allowance(
        &self,
        module: &Pubkey,
        safe: &Pubkey,
        delegate: &DelegateAddress,
        token: &Pubkey,
    ) -> Result<TokenAllowance> {
        let allowance = required(&self.accounts.allowance)?;
        allowance_integration::read_token_allowance(allowance, module, safe, delegate, token)
    }

    fn is_delegate(
        &self,
        module: &Pubkey,
        safe: &Pubkey,
        delegate: &DelegateAddress,
    ) -> Result<bool> {
        let delegates = required(&self.accounts.delegates)?;
        allowance_integration::read_is_delegate(delegates, module, safe, delegate)
    }

    fn execute_allowance_transfer(
        &mut self,
        module: &Pubkey,
        transfer: &AllowanceTransfer,
        signature: &[u8; 65],
    ) -> Result<()> {
        let program = required(&self.accounts.allowance_program)?;
        let safe = required(&self.accounts.safe)?;
        let allowance = required(&self.accounts.allowance)?;
        let delegates = required(&self.accounts.delegates)?;
        let grantee = required(&self.accounts.grantee)?;

        require_keys_eq!(program.key(), *module, DirectStrategyError::InvalidAllowanceAccount);
        require_keys_eq!(safe.key(), transfer.safe, DirectStrategyError::InvalidAllowanceAccount);
        require_keys_eq!(grantee.key(), transfer.to, DirectStrategyError::TokenAccountMismatch);

        let mut extra = Vec::with_capacity(3 + self.remaining_accounts.len());
        if transfer.token != NATIVE_TOKEN {
            let (source, destination) =
                self.token_accounts(&transfer.safe, &transfer.token, &transfer.to)?;
            extra.push(source.to_account_info());
            extra.push(destination.to_account_info());
            extra.push(self.accounts.token_program.to_account_info());
        }
        extra.extend(self.remaining_accounts.iter().cloned());

        allowance_integration::cpi::execute_allowance_transfer(
            program.to_account_info(),
            safe.to_account_info(),
            allowance.to_account_info(),
            delegates.to_account_info(),
            grantee.to_account_info(),
            &extra,
            transfer,
            signature,
        )
    }
}
