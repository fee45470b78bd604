//! In-memory stand-ins for the round, settings registry and funding ledger.

use std::collections::HashMap;

use anchor_lang::prelude::*;
use bytemuck::Zeroable;
use solana_program::keccak;

use crate::{
    allowance_integration::{
        delegate_address_of, generate_transfer_hash, recover_delegate, AllowanceTransfer,
        DelegateAddress, TokenAllowance,
    },
    errors::DirectStrategyError,
    fund_source::FundSource,
    state::{DirectStrategy, RoundAccount, SettingsAccount, StrategyInitParams},
};

pub fn assert_strategy_error<T: std::fmt::Debug>(result: Result<T>, expected: DirectStrategyError) {
    match result {
        Ok(value) => panic!("expected {}, got Ok({:?})", expected.name(), value),
        Err(anchor_lang::error::Error::AnchorError(err)) => {
            assert_eq!(err.error_name, expected.name())
        }
        Err(other) => panic!("expected {}, got {:?}", expected.name(), other),
    }
}

pub fn round_with_operator(operator: &Pubkey, round_end_time: i64) -> RoundAccount {
    let mut round = RoundAccount::zeroed();
    round.round_end_time = round_end_time;
    round.add_operator(*operator).unwrap();
    round
}

pub fn settings_with_fee(protocol_fee_percentage: u64) -> SettingsAccount {
    let mut settings = SettingsAccount::zeroed();
    settings.protocol_fee_percentage = protocol_fee_percentage;
    settings.protocol_treasury = Pubkey::new_unique();
    settings
}

pub fn initialized_strategy(vault: &Pubkey) -> DirectStrategy {
    let mut strategy = DirectStrategy::default();
    strategy
        .initialize(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            StrategyInitParams {
                settings: Pubkey::new_unique(),
                vault: *vault,
                round_fee_percentage: 0,
                round_fee_address: Pubkey::new_unique(),
            },
            &settings_with_fee(0),
        )
        .unwrap();
    strategy
}

/// secp256k1 key standing in for an allowance module delegate
pub struct TestDelegate {
    secret: libsecp256k1::SecretKey,
}

impl TestDelegate {
    pub fn new(seed: u8) -> Self {
        Self {
            secret: libsecp256k1::SecretKey::parse(&[seed; 32]).unwrap(),
        }
    }

    pub fn address(&self) -> DelegateAddress {
        let public_key = libsecp256k1::PublicKey::from_secret_key(&self.secret).serialize();
        let mut uncompressed = [0u8; 64];
        uncompressed.copy_from_slice(&public_key[1..]);
        delegate_address_of(&uncompressed)
    }

    /// Signature over the hash itself (v = 27/28)
    pub fn sign(&self, hash: &[u8; 32]) -> [u8; 65] {
        self.sign_digest(hash, 27)
    }

    /// `eth_sign` signature over the prefixed hash (v = 31/32)
    pub fn eth_sign(&self, hash: &[u8; 32]) -> [u8; 65] {
        let digest = keccak::hashv(&[b"\x19Ethereum Signed Message:\n32", hash]).to_bytes();
        self.sign_digest(&digest, 31)
    }

    fn sign_digest(&self, digest: &[u8; 32], v_offset: u8) -> [u8; 65] {
        let message = libsecp256k1::Message::parse(digest);
        let (signature, recovery_id) = libsecp256k1::sign(&message, &self.secret);
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.serialize());
        out[64] = recovery_id.serialize() + v_offset;
        out
    }
}

type AllowanceKey = (Pubkey, Pubkey, DelegateAddress, Pubkey);

/// Token balances, strategy approvals and an allowance module in one place
#[derive(Default)]
pub struct FakeLedger {
    balances: HashMap<(Pubkey, Pubkey), u64>,
    approvals: HashMap<(Pubkey, Pubkey), u64>,
    allowances: HashMap<AllowanceKey, TokenAllowance>,
    delegates: HashMap<(Pubkey, Pubkey), Vec<DelegateAddress>>,
    transfers: usize,
}

impl FakeLedger {
    pub fn mint(&mut self, owner: &Pubkey, token: &Pubkey, amount: u64) {
        *self.balances.entry((*owner, *token)).or_default() += amount;
    }

    /// Standing approval the vault gives the strategy authority
    pub fn approve(&mut self, vault: &Pubkey, token: &Pubkey, amount: u64) {
        self.approvals.insert((*vault, *token), amount);
    }

    pub fn add_delegate(&mut self, module: &Pubkey, safe: &Pubkey, delegate: DelegateAddress) {
        self.delegates.entry((*module, *safe)).or_default().push(delegate);
    }

    pub fn set_allowance(
        &mut self,
        module: &Pubkey,
        safe: &Pubkey,
        delegate: &DelegateAddress,
        token: &Pubkey,
        amount: u64,
    ) {
        let allowance = self
            .allowances
            .entry((*module, *safe, *delegate, *token))
            .or_insert_with(|| {
                let mut allowance = TokenAllowance::zeroed();
                allowance.safe = *safe;
                allowance.token = *token;
                allowance.delegate = *delegate;
                allowance
            });
        allowance.amount = amount;
    }

    pub fn balance(&self, owner: &Pubkey, token: &Pubkey) -> u64 {
        self.balances.get(&(*owner, *token)).copied().unwrap_or(0)
    }

    /// Number of transfers that actually moved funds
    pub fn transfers(&self) -> usize {
        self.transfers
    }

    fn move_funds(
        &mut self,
        from: &Pubkey,
        token: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<()> {
        require!(self.balance(from, token) >= amount, DirectStrategyError::InsufficientBalance);
        *self.balances.entry((*from, *token)).or_default() -= amount;
        *self.balances.entry((*to, *token)).or_default() += amount;
        self.transfers += 1;
        Ok(())
    }
}

impl FundSource for FakeLedger {
    fn transfer_from(
        &mut self,
        vault: &Pubkey,
        token: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<()> {
        let approved = self.approvals.get(&(*vault, *token)).copied().unwrap_or(0);
        require!(approved >= amount, DirectStrategyError::InsufficientAllowance);

        self.move_funds(vault, token, to, amount)?;
        self.approvals.insert((*vault, *token), approved - amount);
        Ok(())
    }

    fn token_allowance(
        &self,
        module: &Pubkey,
        safe: &Pubkey,
        delegate: &DelegateAddress,
        token: &Pubkey,
    ) -> Result<TokenAllowance> {
        Ok(self
            .allowances
            .get(&(*module, *safe, *delegate, *token))
            .copied()
            .unwrap_or_else(TokenAllowance::zeroed))
    }

    fn is_delegate(
        &self,
        module: &Pubkey,
        safe: &Pubkey,
        delegate: &DelegateAddress,
    ) -> Result<bool> {
        Ok(self
            .delegates
            .get(&(*module, *safe))
            .map_or(false, |delegates| delegates.contains(delegate)))
    }

    fn execute_allowance_transfer(
        &mut self,
        module: &Pubkey,
        transfer: &AllowanceTransfer,
        signature: &[u8; 65],
    ) -> Result<()> {
        let allowance =
            self.token_allowance(module, &transfer.safe, &transfer.delegate, &transfer.token)?;
        let hash = generate_transfer_hash(
            module,
            &transfer.safe,
            &transfer.delegate,
            &transfer.token,
            &transfer.to,
            transfer.amount,
            allowance.nonce,
        );
        require!(
            recover_delegate(&hash, signature)? == transfer.delegate,
            DirectStrategyError::InvalidSignature
        );
        require!(
            self.is_delegate(module, &transfer.safe, &transfer.delegate)?,
            DirectStrategyError::UnauthorizedDelegate
        );
        require!(
            allowance.remaining() >= transfer.amount,
            DirectStrategyError::InsufficientAllowance
        );

        self.move_funds(&transfer.safe, &transfer.token, &transfer.to, transfer.amount)?;

        let stored = self
            .allowances
            .entry((*module, transfer.safe, transfer.delegate, transfer.token))
            .or_insert(allowance);
        stored.spent += transfer.amount;
        stored.nonce += 1;
        Ok(())
    }
}
