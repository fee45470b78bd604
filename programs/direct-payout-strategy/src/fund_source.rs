use anchor_lang::prelude::*;

use crate::{
    allowance_integration::{
        generate_transfer_hash, recover_delegate, AllowanceTransfer, DelegateAddress,
        TokenAllowance,
    },
    constants::NATIVE_TOKEN,
    errors::DirectStrategyError,
    state::{DirectStrategy, SettingsRegistry},
};

/// Where the funds of a payout come from. Exactly one path per request.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum FundingSource {
    /// Pull from `vault` through the strategy's standing token approval
    Vault { vault: Pubkey },
    /// Signed pull from the strategy vault through an allowance module
    AllowanceModule {
        module: Pubkey,
        delegate: [u8; 20],
        signature: [u8; 65],
    },
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PaymentRequest {
    pub source: FundingSource,
    pub token: Pubkey,
    pub amount: u64,
    pub grant_address: Pubkey,
    pub project_id: [u8; 32],
    pub application_index: u64,
}

/// Transfer primitives of the ledger the strategy pulls funds from.
///
/// Implementations re-read balances, approvals and allowance state on every
/// call; nothing is cached across payouts.
pub trait FundSource {
    /// Move `amount` of `token` from `vault` to `to` using the strategy's
    /// standing approval on the vault.
    fn transfer_from(
        &mut self,
        vault: &Pubkey,
        token: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<()>;

    fn token_allowance(
        &self,
        module: &Pubkey,
        safe: &Pubkey,
        delegate: &DelegateAddress,
        token: &Pubkey,
    ) -> Result<TokenAllowance>;

    fn is_delegate(
        &self,
        module: &Pubkey,
        safe: &Pubkey,
        delegate: &DelegateAddress,
    ) -> Result<bool>;

    /// The module re-verifies the signature, enforces the remaining allowance
    /// and advances its nonce.
    fn execute_allowance_transfer(
        &mut self,
        module: &Pubkey,
        transfer: &AllowanceTransfer,
        signature: &[u8; 65],
    ) -> Result<()>;
}

/// A transfer whose every precondition has been checked
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizedTransfer {
    Vault {
        vault: Pubkey,
        token: Pubkey,
        to: Pubkey,
        amount: u64,
    },
    AllowanceModule {
        module: Pubkey,
        transfer: AllowanceTransfer,
        signature: [u8; 65],
    },
}

impl AuthorizedTransfer {
    /// Vault the funds leave from
    pub fn vault(&self) -> Pubkey {
        match self {
            AuthorizedTransfer::Vault { vault, .. } => *vault,
            AuthorizedTransfer::AllowanceModule { transfer, .. } => transfer.safe,
        }
    }

    /// Module that authorized the transfer, default key on the vault path
    pub fn allowance_module(&self) -> Pubkey {
        match self {
            AuthorizedTransfer::Vault { .. } => Pubkey::default(),
            AuthorizedTransfer::AllowanceModule { module, .. } => *module,
        }
    }
}

/// Check everything the selected path needs without moving any funds.
pub fn authorize<F: FundSource>(
    strategy: &DirectStrategy,
    settings: &impl SettingsRegistry,
    funds: &F,
    request: &PaymentRequest,
) -> Result<AuthorizedTransfer> {
    match &request.source {
        FundingSource::Vault { vault } => {
            // Native balance moves only under the vault's own authorization logic
            require!(request.token != NATIVE_TOKEN, DirectStrategyError::NativeTokenNotAllowed);
            require!(request.amount > 0, DirectStrategyError::InvalidAmount);

            Ok(AuthorizedTransfer::Vault {
                vault: *vault,
                token: request.token,
                to: request.grant_address,
                amount: request.amount,
            })
        }
        FundingSource::AllowanceModule {
            module,
            delegate,
            signature,
        } => {
            require!(request.amount > 0, DirectStrategyError::InvalidAmount);
            require!(settings.is_trusted(module), DirectStrategyError::UntrustedAllowanceModule);

            let hash = transfer_hash(
                funds,
                module,
                &strategy.vault,
                delegate,
                &request.token,
                &request.grant_address,
                request.amount,
            )?;
            let signer = recover_delegate(&hash, signature)?;
            require!(signer == *delegate, DirectStrategyError::InvalidSignature);
            require!(
                funds.is_delegate(module, &strategy.vault, delegate)?,
                DirectStrategyError::UnauthorizedDelegate
            );

            Ok(AuthorizedTransfer::AllowanceModule {
                module: *module,
                transfer: AllowanceTransfer {
                    safe: strategy.vault,
                    token: request.token,
                    to: request.grant_address,
                    amount: request.amount,
                    delegate: *delegate,
                },
                signature: *signature,
            })
        }
    }
}

/// Run the single mutating primitive of an authorized transfer.
pub fn execute<F: FundSource>(funds: &mut F, transfer: &AuthorizedTransfer) -> Result<()> {
    match transfer {
        AuthorizedTransfer::Vault {
            vault,
            token,
            to,
            amount,
        } => funds.transfer_from(vault, token, to, *amount),
        AuthorizedTransfer::AllowanceModule {
            module,
            transfer,
            signature,
        } => funds.execute_allowance_transfer(module, transfer, signature),
    }
}

/// Transfer hash for the module's current nonce, the message a delegate signs.
pub fn transfer_hash<F: FundSource>(
    funds: &F,
    module: &Pubkey,
    safe: &Pubkey,
    delegate: &DelegateAddress,
    token: &Pubkey,
    to: &Pubkey,
    amount: u64,
) -> Result<[u8; 32]> {
    let allowance = funds.token_allowance(module, safe, delegate, token)?;
    Ok(generate_transfer_hash(module, safe, delegate, token, to, amount, allowance.nonce))
}
