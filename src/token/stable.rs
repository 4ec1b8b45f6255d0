//! The stable-value token.
//!
//! A standard fungible token whose supply is controlled by a single owner.
//! The engine is made owner at deployment and is then the only party able to
//! mint or burn; everyone else can only hold, approve and transfer.

use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::token::erc20::{FungibleToken, InMemoryToken};
use crate::utils::address::Address;
use crate::utils::math::Amount;
use crate::utils::validation::{validate_balance, validate_non_zero};

// ═══════════════════════════════════════════════════════════════════════════════
// STABLE TOKEN TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Mint/burn capability over the stable-value token
pub trait StableToken: FungibleToken {
    /// Current owner, the only address allowed to mint and burn
    fn owner(&self) -> Result<Address>;

    /// Create `amount` new tokens for `to`; `caller` must be the owner
    fn mint(&self, caller: Address, to: Address, amount: Amount) -> Result<bool>;

    /// Destroy `amount` of the caller's own tokens; `caller` must be the owner
    fn burn(&self, caller: Address, amount: Amount) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STABLE COIN
// ═══════════════════════════════════════════════════════════════════════════════

/// Owner-gated stable coin backed by an [`InMemoryToken`] ledger
#[derive(Debug)]
pub struct StableCoin {
    ledger: InMemoryToken,
    owner: RwLock<Address>,
}

impl StableCoin {
    /// Create the token with `owner` holding the mint/burn capability
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            ledger: InMemoryToken::new(address, "DecentralizedStableCoin", "DSC"),
            owner: RwLock::new(owner),
        }
    }

    /// Hand the mint/burn capability to `new_owner`
    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<()> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let mut owner = self.owner.write().map_err(|_| Error::Lock)?;
        tracing::info!(from = %owner.short(), to = %new_owner.short(), "Stable coin ownership transferred");
        *owner = new_owner;
        Ok(())
    }

    /// Verify supply invariant of the underlying ledger
    pub fn verify_supply_invariant(&self) -> Result<bool> {
        self.ledger.verify_supply_invariant()
    }

    fn only_owner(&self, caller: Address) -> Result<()> {
        if self.owner()? != caller {
            return Err(Error::Unauthorized("caller is not the stable coin owner".into()));
        }
        Ok(())
    }
}

impl FungibleToken for StableCoin {
    fn address(&self) -> Address {
        self.ledger.address()
    }

    fn total_supply(&self) -> Result<Amount> {
        self.ledger.total_supply()
    }

    fn balance_of(&self, owner: &Address) -> Result<Amount> {
        self.ledger.balance_of(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount> {
        self.ledger.allowance(owner, spender)
    }

    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<bool> {
        self.ledger.approve(owner, spender, amount)
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<bool> {
        self.ledger.transfer(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool> {
        self.ledger.transfer_from(spender, from, to, amount)
    }
}

impl StableToken for StableCoin {
    fn owner(&self) -> Result<Address> {
        let owner = self.owner.read().map_err(|_| Error::Lock)?;
        Ok(*owner)
    }

    fn mint(&self, caller: Address, to: Address, amount: Amount) -> Result<bool> {
        self.only_owner(caller)?;
        if to.is_zero() {
            return Err(Error::ZeroAddress);
        }
        validate_non_zero(amount)?;
        self.ledger.mint_to(to, amount)?;
        Ok(true)
    }

    fn burn(&self, caller: Address, amount: Amount) -> Result<()> {
        self.only_owner(caller)?;
        validate_non_zero(amount)?;
        validate_balance(self.ledger.balance_of(&caller)?, amount)?;
        self.ledger.burn_from_balance(caller, amount)
    }
}
