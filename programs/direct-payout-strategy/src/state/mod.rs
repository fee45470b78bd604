pub mod strategy;
pub mod round;
pub mod settings;

pub use strategy::*;
pub use round::*;
pub use settings::*;

use anchor_lang::prelude::*;
use bytemuck::Pod;

use crate::{constants::DISCRIMINATOR_LEN, errors::DirectStrategyError};

/// Read a fixed-layout account owned by another program, skipping its discriminator
pub(crate) fn load_external<T: Pod>(
    account: &AccountInfo,
    owner: &Pubkey,
    error: DirectStrategyError,
) -> Result<T> {
    require_keys_eq!(*account.owner, *owner, error);

    let data = account.try_borrow_data()?;
    let end = DISCRIMINATOR_LEN + std::mem::size_of::<T>();
    if data.len() < end {
        return Err(error.into());
    }

    bytemuck::try_pod_read_unaligned::<T>(&data[DISCRIMINATOR_LEN..end]).map_err(|_| error.into())
}
