use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};

use crate::constants::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Canceled,
}

impl ApplicationStatus {
    fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            1 => ApplicationStatus::Accepted,
            2 => ApplicationStatus::Rejected,
            3 => ApplicationStatus::Canceled,
            _ => ApplicationStatus::Pending,
        }
    }

    #[cfg(test)]
    fn to_bits(self) -> u64 {
        match self {
            ApplicationStatus::Pending => 0,
            ApplicationStatus::Accepted => 1,
            ApplicationStatus::Rejected => 2,
            ApplicationStatus::Canceled => 3,
        }
    }
}

/// Read-only view of the round a strategy is bound to.
pub trait RoundState {
    fn is_round_operator(&self, who: &Pubkey) -> bool;
    fn application_status(&self, application_index: u64) -> ApplicationStatus;
    fn round_end_time(&self) -> i64;
}

/// Round account as laid out by the round program (after the discriminator)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RoundAccount {
    pub round_start_time: i64,
    pub round_end_time: i64,
    pub application_count: u64,
    pub operator_count: u64,
    pub operators: [Pubkey; MAX_ROUND_OPERATORS],
    /// 2 bits per application, 32 applications per word
    pub application_statuses: [u64; STATUS_WORDS],
    pub reserved: [u8; 64],
}

impl RoundAccount {
    pub fn operators(&self) -> &[Pubkey] {
        let count = (self.operator_count as usize).min(MAX_ROUND_OPERATORS);
        &self.operators[..count]
    }

    #[cfg(test)]
    pub fn add_operator(&mut self, operator: Pubkey) -> Result<()> {
        let count = self.operator_count as usize;
        require!(
            count < MAX_ROUND_OPERATORS,
            crate::errors::DirectStrategyError::InvalidRoundAccount
        );
        self.operators[count] = operator;
        self.operator_count += 1;
        Ok(())
    }

    #[cfg(test)]
    pub fn set_application_status(
        &mut self,
        application_index: u64,
        status: ApplicationStatus,
    ) -> Result<()> {
        let (word, shift) = status_position(application_index)
            .ok_or(crate::errors::DirectStrategyError::InvalidRoundAccount)?;
        let cleared = self.application_statuses[word] & !(0b11u64 << shift);
        self.application_statuses[word] = cleared | (status.to_bits() << shift);
        Ok(())
    }
}

impl RoundState for RoundAccount {
    fn is_round_operator(&self, who: &Pubkey) -> bool {
        self.operators().contains(who)
    }

    fn application_status(&self, application_index: u64) -> ApplicationStatus {
        match status_position(application_index) {
            Some((word, shift)) => {
                ApplicationStatus::from_bits(self.application_statuses[word] >> shift)
            }
            None => ApplicationStatus::Pending,
        }
    }

    fn round_end_time(&self) -> i64 {
        self.round_end_time
    }
}

fn status_position(application_index: u64) -> Option<(usize, u64)> {
    let word = application_index / APPLICATIONS_PER_STATUS_WORD;
    if word >= STATUS_WORDS as u64 {
        return None;
    }
    Some((word as usize, (application_index % APPLICATIONS_PER_STATUS_WORD) * 2))
}

/// Load the round account, rejecting accounts not owned by the round program
pub fn load_round(account: &AccountInfo) -> Result<RoundAccount> {
    super::load_external(
        account,
        &ROUND_PROGRAM_ID,
        crate::errors::DirectStrategyError::InvalidRoundAccount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_status_bitmap() {
        let mut round = RoundAccount::zeroed();
        assert_eq!(round.application_status(0), ApplicationStatus::Pending);

        round.set_application_status(0, ApplicationStatus::Accepted).unwrap();
        round.set_application_status(1, ApplicationStatus::Rejected).unwrap();
        round.set_application_status(33, ApplicationStatus::Canceled).unwrap();

        assert_eq!(round.application_status(0), ApplicationStatus::Accepted);
        assert_eq!(round.application_status(1), ApplicationStatus::Rejected);
        assert_eq!(round.application_status(2), ApplicationStatus::Pending);
        assert_eq!(round.application_status(33), ApplicationStatus::Canceled);

        // Overwriting clears the previous bits
        round.set_application_status(33, ApplicationStatus::Accepted).unwrap();
        assert_eq!(round.application_status(33), ApplicationStatus::Accepted);
        assert_eq!(round.application_status(32), ApplicationStatus::Pending);
    }

    #[test]
    fn test_out_of_range_application_is_pending() {
        let mut round = RoundAccount::zeroed();
        let beyond = APPLICATIONS_PER_STATUS_WORD * STATUS_WORDS as u64;
        assert!(round.set_application_status(beyond, ApplicationStatus::Accepted).is_err());
        assert_eq!(round.application_status(beyond), ApplicationStatus::Pending);
    }

    #[test]
    fn test_operators_only_counts_registered_slots() {
        let mut round = RoundAccount::zeroed();
        let operator = Pubkey::new_unique();
        round.add_operator(operator).unwrap();

        assert!(round.is_round_operator(&operator));
        assert!(!round.is_round_operator(&Pubkey::new_unique()));
        // Unused slots are zeroed and must not grant the role
        assert!(!round.is_round_operator(&Pubkey::default()));
    }

    #[test]
    fn test_load_round_checks_owner_and_layout() {
        let key = Pubkey::new_unique();
        let mut round = RoundAccount::zeroed();
        round.round_end_time = 1_000;
        let mut data = vec![0u8; DISCRIMINATOR_LEN];
        data.extend_from_slice(bytemuck::bytes_of(&round));
        let mut lamports = 0u64;
        let owner = ROUND_PROGRAM_ID;
        let account =
            AccountInfo::new(&key, false, false, &mut lamports, &mut data, &owner, false, 0);
        assert_eq!(load_round(&account).unwrap().round_end_time(), 1_000);

        let mut data = vec![0u8; DISCRIMINATOR_LEN];
        data.extend_from_slice(bytemuck::bytes_of(&round));
        let mut lamports = 0u64;
        let wrong_owner = Pubkey::new_unique();
        let account =
            AccountInfo::new(&key, false, false, &mut lamports, &mut data, &wrong_owner, false, 0);
        assert!(load_round(&account).is_err());

        let mut short = vec![0u8; DISCRIMINATOR_LEN + 4];
        let mut lamports = 0u64;
        let account =
            AccountInfo::new(&key, false, false, &mut lamports, &mut short, &owner, false, 0);
        assert!(load_round(&account).is_err());
    }
}
