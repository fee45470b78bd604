use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};
use solana_program::keccak;
use solana_program::secp256k1_recover::secp256k1_recover;

use crate::constants::*;
use crate::errors::DirectStrategyError;

/// Ethereum-style address of a secp256k1 delegate key
pub type DelegateAddress = [u8; 20];

pub const DOMAIN_SEPARATOR_TYPE: &[u8] = b"EIP712Domain(pubkey verifyingProgram)";
pub const ALLOWANCE_TRANSFER_TYPE: &[u8] =
    b"AllowanceTransfer(pubkey safe,pubkey token,pubkey to,uint64 amount,address delegate,uint16 nonce)";
const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Upper bound of a canonical (low-s) secp256k1 signature, n / 2
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Per (safe, delegate, token) allowance kept by the allowance module
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TokenAllowance {
    pub safe: Pubkey,
    pub token: Pubkey,
    pub delegate: DelegateAddress,
    pub padding1: [u8; 4],
    pub amount: u64,
    pub spent: u64,
    pub reset_time_min: u32,
    pub last_reset_min: u32,
    pub nonce: u16,
    pub padding2: [u8; 6],
}

impl TokenAllowance {
    pub fn remaining(&self) -> u64 {
        self.amount.saturating_sub(self.spent)
    }
}

/// Delegates a safe registered on the allowance module
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DelegateRegistry {
    pub safe: Pubkey,
    pub delegate_count: u64,
    pub delegates: [DelegateAddress; MAX_DELEGATES],
}

impl DelegateRegistry {
    pub fn contains(&self, delegate: &DelegateAddress) -> bool {
        let count = (self.delegate_count as usize).min(MAX_DELEGATES);
        self.delegates[..count].contains(delegate)
    }
}

/// Arguments of the allowance module's transfer primitive
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AllowanceTransfer {
    pub safe: Pubkey,
    pub token: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub delegate: [u8; 20],
}

pub fn allowance_address(
    module: &Pubkey,
    safe: &Pubkey,
    delegate: &DelegateAddress,
    token: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[ALLOWANCE_SEED, safe.as_ref(), delegate.as_ref(), token.as_ref()],
        module,
    )
    .0
}

pub fn delegates_address(module: &Pubkey, safe: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[DELEGATES_SEED, safe.as_ref()], module).0
}

/// Hash the allowance module verifies for a delegated transfer.
///
/// `keccak(0x19 || 0x01 || domain_separator || struct_hash)` where the
/// domain binds the module program and the struct hash covers every field of
/// the transfer plus the module's current nonce for this allowance. Integers
/// are 32-byte big-endian words and the delegate is left-padded to 32 bytes.
pub fn generate_transfer_hash(
    module: &Pubkey,
    safe: &Pubkey,
    delegate: &DelegateAddress,
    token: &Pubkey,
    to: &Pubkey,
    amount: u64,
    nonce: u16,
) -> [u8; 32] {
    let domain_separator = keccak::hashv(&[
        &keccak::hash(DOMAIN_SEPARATOR_TYPE).to_bytes(),
        module.as_ref(),
    ]);

    let struct_hash = keccak::hashv(&[
        &keccak::hash(ALLOWANCE_TRANSFER_TYPE).to_bytes(),
        safe.as_ref(),
        token.as_ref(),
        to.as_ref(),
        &word(amount as u128),
        &padded_address(delegate),
        &word(nonce as u128),
    ]);

    keccak::hashv(&[
        &[0x19u8, 0x01],
        &domain_separator.to_bytes(),
        &struct_hash.to_bytes(),
    ])
    .to_bytes()
}

/// Recover the delegate address that signed `hash`.
///
/// `v` of 27/28 signs the hash itself, 31/32 is an `eth_sign` signature over
/// the prefixed message hash.
pub fn recover_delegate(hash: &[u8; 32], signature: &[u8; 65]) -> Result<DelegateAddress> {
    let (rs, v) = signature.split_at(64);
    require!(rs[32..] <= SECP256K1_HALF_ORDER[..], DirectStrategyError::InvalidSignature);

    let (digest, recovery_id) = match v[0] {
        27 | 28 => (*hash, v[0] - 27),
        31 | 32 => (
            keccak::hashv(&[ETH_SIGNED_MESSAGE_PREFIX, hash]).to_bytes(),
            v[0] - 31,
        ),
        _ => return err!(DirectStrategyError::InvalidSignature),
    };

    let public_key = secp256k1_recover(&digest, recovery_id, rs)
        .map_err(|_| error!(DirectStrategyError::InvalidSignature))?;

    Ok(delegate_address_of(&public_key.to_bytes()))
}

/// Address of an uncompressed secp256k1 public key (64 bytes, no prefix)
pub fn delegate_address_of(public_key: &[u8; 64]) -> DelegateAddress {
    let hash = keccak::hash(public_key).to_bytes();
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

fn word(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

fn padded_address(address: &DelegateAddress) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address);
    out
}

pub fn deserialize_token_allowance(
    account: &AccountInfo,
    module: &Pubkey,
) -> Result<TokenAllowance> {
    crate::state::load_external(account, module, DirectStrategyError::InvalidAllowanceAccount)
}

pub fn deserialize_delegate_registry(
    account: &AccountInfo,
    module: &Pubkey,
) -> Result<DelegateRegistry> {
    crate::state::load_external(account, module, DirectStrategyError::InvalidAllowanceAccount)
}

/// Current allowance of `delegate` for `token`. An allowance the safe never
/// set has no account yet and reads as zero, like the module itself does.
pub fn read_token_allowance(
    account: &AccountInfo,
    module: &Pubkey,
    safe: &Pubkey,
    delegate: &DelegateAddress,
    token: &Pubkey,
) -> Result<TokenAllowance> {
    require_keys_eq!(
        account.key(),
        allowance_address(module, safe, delegate, token),
        DirectStrategyError::InvalidAllowanceAccount
    );
    if account.data_is_empty() {
        return Ok(TokenAllowance::zeroed());
    }
    deserialize_token_allowance(account, module)
}

pub fn read_is_delegate(
    account: &AccountInfo,
    module: &Pubkey,
    safe: &Pubkey,
    delegate: &DelegateAddress,
) -> Result<bool> {
    require_keys_eq!(
        account.key(),
        delegates_address(module, safe),
        DirectStrategyError::InvalidAllowanceAccount
    );
    if account.data_is_empty() {
        return Ok(false);
    }
    Ok(deserialize_delegate_registry(account, module)?.contains(delegate))
}

/// CPI helpers for the allowance module
pub mod cpi {
    use super::*;
    use solana_program::hash::hash;
    use solana_program::instruction::{AccountMeta, Instruction};

    #[derive(AnchorSerialize)]
    struct ExecuteAllowanceTransferArgs {
        transfer: AllowanceTransfer,
        signature: [u8; 65],
    }

    /// Anchor-style instruction discriminator of `execute_allowance_transfer`
    pub fn execute_allowance_transfer_discriminator() -> [u8; 8] {
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&hash(b"global:execute_allowance_transfer").to_bytes()[..8]);
        discriminator
    }

    /// Keys of the accounts the module's transfer instruction takes, in order
    pub struct AllowanceTransferKeys {
        pub safe: Pubkey,
        pub allowance: Pubkey,
        pub delegates: Pubkey,
        pub recipient: Pubkey,
    }

    /// `safe`, `allowance` and `recipient` are written by the module, `delegates`
    /// is read. `extra` carries token accounts/programs it needs for SPL transfers.
    pub fn execute_allowance_transfer_instruction(
        module: &Pubkey,
        keys: &AllowanceTransferKeys,
        extra: Vec<AccountMeta>,
        transfer: &AllowanceTransfer,
        signature: &[u8; 65],
    ) -> Result<Instruction> {
        let args = ExecuteAllowanceTransferArgs {
            transfer: transfer.clone(),
            signature: *signature,
        };
        let mut data = execute_allowance_transfer_discriminator().to_vec();
        data.extend_from_slice(
            &args
                .try_to_vec()
                .map_err(|_| error!(DirectStrategyError::InvalidAllowanceAccount))?,
        );

        let mut accounts = vec![
            AccountMeta::new(keys.safe, false),
            AccountMeta::new(keys.allowance, false),
            AccountMeta::new_readonly(keys.delegates, false),
            AccountMeta::new(keys.recipient, false),
        ];
        accounts.extend(extra);

        Ok(Instruction {
            program_id: *module,
            accounts,
            data,
        })
    }

    pub fn execute_allowance_transfer<'info>(
        module_program: AccountInfo<'info>,
        safe: AccountInfo<'info>,
        allowance: AccountInfo<'info>,
        delegates: AccountInfo<'info>,
        recipient: AccountInfo<'info>,
        extra: &[AccountInfo<'info>],
        transfer: &AllowanceTransfer,
        signature: &[u8; 65],
    ) -> Result<()> {
        let keys = AllowanceTransferKeys {
            safe: safe.key(),
            allowance: allowance.key(),
            delegates: delegates.key(),
            recipient: recipient.key(),
        };
        let extra_metas = extra
            .iter()
            .map(|account| AccountMeta {
                pubkey: account.key(),
                is_signer: false,
                is_writable: account.is_writable,
            })
            .collect();
        let instruction = execute_allowance_transfer_instruction(
            &module_program.key(),
            &keys,
            extra_metas,
            transfer,
            signature,
        )?;

        let mut infos = vec![safe, allowance, delegates, recipient];
        infos.extend(extra.iter().cloned());
        infos.push(module_program);

        anchor_lang::solana_program::program::invoke(&instruction, &infos)?;

        Ok(())
    }
}
