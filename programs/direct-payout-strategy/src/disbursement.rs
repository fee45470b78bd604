use anchor_lang::prelude::*;

use crate::{
    errors::DirectStrategyError,
    events::PayoutMade,
    fund_source::{self, FundSource, PaymentRequest},
    state::{ApplicationStatus, DirectStrategy, RoundState, SettingsRegistry},
};

/// Pay an accepted application from the request's funding source.
///
/// Every check runs before the one transfer primitive, so a failure leaves no
/// token movement behind. The returned event is only produced once funds
/// moved. No fee is deducted from `amount`.
pub fn payout<F: FundSource>(
    strategy: &DirectStrategy,
    round: &impl RoundState,
    settings: &impl SettingsRegistry,
    funds: &mut F,
    operator: &Pubkey,
    request: &PaymentRequest,
) -> Result<PayoutMade> {
    require!(strategy.is_initialized, DirectStrategyError::NotInitialized);
    require!(round.is_round_operator(operator), DirectStrategyError::NotRoundOperator);
    require!(
        round.application_status(request.application_index) == ApplicationStatus::Accepted,
        DirectStrategyError::ApplicationNotAccepted
    );

    let transfer = fund_source::authorize(strategy, settings, funds, request)?;
    fund_source::execute(funds, &transfer)?;

    Ok(PayoutMade {
        vault: transfer.vault(),
        token: request.token,
        amount: request.amount,
        grant_address: request.grant_address,
        project_id: request.project_id,
        application_index: request.application_index,
        allowance_module: transfer.allowance_module(),
    })
}
