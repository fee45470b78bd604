use anchor_lang::prelude::*;

#[error_code]
pub enum DirectStrategyError {
    #[msg("not round operator")]
    NotRoundOperator,

    #[msg("Recovered signer is not a registered delegate of the allowance module")]
    UnauthorizedDelegate,

    #[msg("Strategy already initialized")]
    AlreadyInitialized,

    #[msg("Strategy not initialized")]
    NotInitialized,

    #[msg("round has ended")]
    RoundEnded,

    #[msg("Application is not accepted")]
    ApplicationNotAccepted,

    #[msg("Native token not allowed on the direct vault path")]
    NativeTokenNotAllowed,

    #[msg("Insufficient allowance for this transfer")]
    InsufficientAllowance,

    #[msg("Insufficient vault balance for this transfer")]
    InsufficientBalance,

    #[msg("Invalid allowance signature")]
    InvalidSignature,

    #[msg("Allowance module is not trusted by the settings registry")]
    UntrustedAllowanceModule,

    #[msg("Payout amount must be greater than zero")]
    InvalidAmount,

    #[msg("Could not decode strategy init params")]
    InvalidInitParams,

    #[msg("Invalid fee percentage, round + protocol fee must be <= 100000")]
    InvalidFeePercentage,

    #[msg("Invalid round account")]
    InvalidRoundAccount,

    #[msg("Invalid settings account")]
    InvalidSettingsAccount,

    #[msg("Invalid allowance module account")]
    InvalidAllowanceAccount,

    #[msg("Token account does not match the payment")]
    TokenAccountMismatch,

    #[msg("Account required by the selected funding source is missing")]
    MissingFundSourceAccount,

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Voting is not supported by the direct strategy")]
    VoteNotImplemented,
}

/// Coarse classification so operator tooling can tell failure classes apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the required role.
    Authorization,
    /// Operation attempted outside its valid state window.
    Lifecycle,
    /// Target application has not cleared the accept gate.
    ApplicationState,
    /// The chosen funding path cannot satisfy the request.
    FundSource,
    /// Malformed accounts or parameters.
    Account,
}

impl DirectStrategyError {
    pub fn kind(&self) -> ErrorKind {
        use DirectStrategyError::*;

        match self {
            NotRoundOperator | UnauthorizedDelegate => ErrorKind::Authorization,
            AlreadyInitialized | NotInitialized | RoundEnded | VoteNotImplemented => {
                ErrorKind::Lifecycle
            }
            ApplicationNotAccepted => ErrorKind::ApplicationState,
            NativeTokenNotAllowed
            | InsufficientAllowance
            | InsufficientBalance
            | InvalidSignature
            | UntrustedAllowanceModule
            | InvalidAmount => ErrorKind::FundSource,
            InvalidInitParams
            | InvalidFeePercentage
            | InvalidRoundAccount
            | InvalidSettingsAccount
            | InvalidAllowanceAccount
            | TokenAccountMismatch
            | MissingFundSourceAccount
            | MathOverflow => ErrorKind::Account,
        }
    }
}
