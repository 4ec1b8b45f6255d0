//! Fungible token interface and in-memory ledger.
//!
//! This module defines the subset of standard fungible-token semantics the
//! engine relies on for collateral custody and user-initiated burns:
//! - Balance and allowance tracking
//! - Transfers and allowance-based transfers
//! - Supply accounting

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::utils::address::Address;
use crate::utils::constants::TOKEN_DECIMALS;
use crate::utils::math::{safe_add, safe_sub, Amount};
use crate::utils::validation::validate_balance;

// ═══════════════════════════════════════════════════════════════════════════════
// FUNGIBLE TOKEN TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// A transferable balance ledger.
///
/// The first address argument of every mutating call is the caller. Calls
/// return `Ok(false)` when the token declines the transfer without reverting;
/// the engine treats both that and an error as a failed transfer.
pub trait FungibleToken: Send + Sync {
    /// Contract address of the token
    fn address(&self) -> Address;

    /// Decimal places of one whole unit
    fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    /// Total tokens in circulation
    fn total_supply(&self) -> Result<Amount>;

    /// Balance held by `owner`
    fn balance_of(&self, owner: &Address) -> Result<Amount>;

    /// Remaining amount `spender` may move on behalf of `owner`
    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount>;

    /// Let `spender` move up to `amount` of `owner`'s tokens
    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<bool>;

    /// Move `amount` from `from` (the caller) to `to`
    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<bool>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance
    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct TokenState {
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
}

impl TokenState {
    fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let from_balance = self.balance_of(&from);
        validate_balance(from_balance, amount)?;
        if from == to {
            return Ok(());
        }
        let to_balance = safe_add(self.balance_of(&to), amount)?;

        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance);
        Ok(())
    }

    fn set_balance(&mut self, owner: Address, balance: Amount) {
        if balance == 0 {
            self.balances.remove(&owner);
        } else {
            self.balances.insert(owner, balance);
        }
    }

    fn credit(&mut self, to: Address, amount: Amount) -> Result<()> {
        let new_supply = safe_add(self.total_supply, amount)?;
        let new_balance = safe_add(self.balance_of(&to), amount)?;
        self.total_supply = new_supply;
        self.set_balance(to, new_balance);
        Ok(())
    }

    fn debit(&mut self, from: Address, amount: Amount) -> Result<()> {
        let new_balance = safe_sub(self.balance_of(&from), amount)?;
        self.set_balance(from, new_balance);
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY TOKEN
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory fungible token, used for collateral assets in tests and the
/// simulator and as the ledger underneath [`crate::token::StableCoin`]
#[derive(Debug)]
pub struct InMemoryToken {
    address: Address,
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    decimals: u8,
    state: RwLock<TokenState>,
}

impl InMemoryToken {
    /// Create an empty token
    pub fn new(address: Address, name: &str, symbol: &str) -> Self {
        Self {
            address,
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: TOKEN_DECIMALS,
            state: RwLock::new(TokenState::default()),
        }
    }

    /// Use a non-default number of decimals
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Create new tokens out of thin air. Unrestricted; only for test assets.
    pub fn mint_to(&self, to: Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let mut state = self.state.write().map_err(|_| Error::Lock)?;
        state.credit(to, amount)
    }

    /// Destroy tokens held by `from`
    pub(crate) fn burn_from_balance(&self, from: Address, amount: Amount) -> Result<()> {
        let mut state = self.state.write().map_err(|_| Error::Lock)?;
        state.debit(from, amount)
    }

    /// Number of accounts holding a non-zero balance
    pub fn holder_count(&self) -> Result<usize> {
        let state = self.state.read().map_err(|_| Error::Lock)?;
        Ok(state.balances.len())
    }

    /// Verify supply invariant (total_supply == sum of all balances)
    pub fn verify_supply_invariant(&self) -> Result<bool> {
        let state = self.state.read().map_err(|_| Error::Lock)?;
        let sum = state
            .balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b));
        Ok(sum == Some(state.total_supply))
    }
}

impl FungibleToken for InMemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn total_supply(&self) -> Result<Amount> {
        let state = self.state.read().map_err(|_| Error::Lock)?;
        Ok(state.total_supply)
    }

    fn balance_of(&self, owner: &Address) -> Result<Amount> {
        let state = self.state.read().map_err(|_| Error::Lock)?;
        Ok(state.balance_of(owner))
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount> {
        let state = self.state.read().map_err(|_| Error::Lock)?;
        Ok(state.allowances.get(&(*owner, *spender)).copied().unwrap_or(0))
    }

    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<bool> {
        if spender.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let mut state = self.state.write().map_err(|_| Error::Lock)?;
        state.allowances.insert((owner, spender), amount);
        Ok(true)
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<bool> {
        let mut state = self.state.write().map_err(|_| Error::Lock)?;
        state.move_balance(from, to, amount)?;
        Ok(true)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool> {
        let mut state = self.state.write().map_err(|_| Error::Lock)?;
        let allowed = state.allowances.get(&(from, spender)).copied().unwrap_or(0);
        if allowed < amount {
            return Err(Error::InsufficientAllowance {
                required: amount,
                available: allowed,
            });
        }
        state.move_balance(from, to, amount)?;
        // An allowance of Amount::MAX never decreases
        if allowed != Amount::MAX {
            state.allowances.insert((from, spender), allowed - amount);
        }
        Ok(true)
    }
}
