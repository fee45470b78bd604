use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};

use crate::constants::*;
use crate::errors::DirectStrategyError;

/// Read-only view of the protocol-wide settings registry.
pub trait SettingsRegistry {
    /// Protocol fee over `DENOMINATOR`
    fn protocol_fee_percentage(&self) -> u32;
    fn protocol_treasury(&self) -> Pubkey;
    fn is_trusted(&self, registry: &Pubkey) -> bool;
}

/// Settings account as laid out by the settings program (after the discriminator)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SettingsAccount {
    pub protocol_fee_percentage: u64,
    pub protocol_treasury: Pubkey,
    pub trusted_count: u64,
    pub trusted_registries: [Pubkey; MAX_TRUSTED_REGISTRIES],
    pub reserved: [u8; 64],
}

impl SettingsAccount {
    pub fn trusted_registries(&self) -> &[Pubkey] {
        let count = (self.trusted_count as usize).min(MAX_TRUSTED_REGISTRIES);
        &self.trusted_registries[..count]
    }

    #[cfg(test)]
    pub fn add_trusted(&mut self, registry: Pubkey) -> Result<()> {
        let count = self.trusted_count as usize;
        require!(count < MAX_TRUSTED_REGISTRIES, DirectStrategyError::InvalidSettingsAccount);
        self.trusted_registries[count] = registry;
        self.trusted_count += 1;
        Ok(())
    }
}

impl SettingsRegistry for SettingsAccount {
    fn protocol_fee_percentage(&self) -> u32 {
        // Out-of-range values are clamped so fee validation fails closed
        self.protocol_fee_percentage.min(DENOMINATOR as u64) as u32
    }

    fn protocol_treasury(&self) -> Pubkey {
        self.protocol_treasury
    }

    fn is_trusted(&self, registry: &Pubkey) -> bool {
        self.trusted_registries().contains(registry)
    }
}

pub fn load_settings(account: &AccountInfo) -> Result<SettingsAccount> {
    super::load_external(account, &SETTINGS_PROGRAM_ID, DirectStrategyError::InvalidSettingsAccount)
}
