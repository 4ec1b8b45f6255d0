//! Input validation helpers.
//!
//! Checks shared by the ledgers, the engine and the reference collaborators.

use crate::error::{Error, Result};
use crate::utils::address::Address;
use crate::utils::math::Amount;

/// Validate that an amount is non-zero
pub fn validate_non_zero(amount: Amount) -> Result<()> {
    if amount == 0 {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}

/// Validate that the collateral token and price feed lists pair up
pub fn validate_registry_lengths(tokens: usize, feeds: usize) -> Result<()> {
    if tokens != feeds {
        return Err(Error::TokenAddressesAndPriceFeedAddressesMustBeSameLength {
            tokens,
            feeds,
        });
    }
    Ok(())
}

/// Validate that an address is not the zero address
pub fn validate_address(address: &Address, name: &str) -> Result<()> {
    if address.is_zero() {
        return Err(Error::Configuration(format!("{} cannot be the zero address", name)));
    }
    Ok(())
}

/// Validate that a balance covers the requested amount
pub fn validate_balance(available: Amount, required: Amount) -> Result<()> {
    if available < required {
        return Err(Error::InsufficientBalance { required, available });
    }
    Ok(())
}
