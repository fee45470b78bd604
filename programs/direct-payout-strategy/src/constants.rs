use anchor_lang::prelude::*;

/// PDA seeds
pub const STRATEGY_SEED: &[u8] = b"direct_strategy";
/// Delegate of the vault token accounts on the direct path: [STRATEGY_AUTHORITY_SEED, strategy]
pub const STRATEGY_AUTHORITY_SEED: &[u8] = b"strategy_authority";
/// Allowance module PDAs: [ALLOWANCE_SEED, safe, delegate, token] and [DELEGATES_SEED, safe]
pub const ALLOWANCE_SEED: &[u8] = b"allowance";
pub const DELEGATES_SEED: &[u8] = b"delegates";

/// Strategy version marker (0.2.0)
pub const VERSION: [u8; 3] = [0, 2, 0];

/// Fee percentages are expressed over this denominator (5% == 5_000)
pub const DENOMINATOR: u32 = 100_000;

/// Native currency sentinel used in place of a mint
pub const NATIVE_TOKEN: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// Anchor account discriminator length, skipped when reading external accounts
pub const DISCRIMINATOR_LEN: usize = 8;

/// External layout capacities
pub const MAX_ROUND_OPERATORS: usize = 16;
pub const MAX_TRUSTED_REGISTRIES: usize = 16;
pub const MAX_DELEGATES: usize = 16;
pub const APPLICATIONS_PER_STATUS_WORD: u64 = 32;
pub const STATUS_WORDS: usize = 64;

/// Round program owning round accounts (operators, application statuses, timestamps)
pub const ROUND_PROGRAM_ID: Pubkey = solana_program::pubkey!("GrantRound111111111111111111111111111111111");

/// Settings program owning the protocol fee / trusted registry account
pub const SETTINGS_PROGRAM_ID: Pubkey = solana_program::pubkey!("GrantSettings111111111111111111111111111111");
