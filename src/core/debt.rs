//! Per-account stable-token debt.
//!
//! An account's debt is the amount of stable token minted to it by the engine
//! and not yet burned on its behalf.

use std::collections::HashMap;

use crate::error::Result;
use crate::utils::address::Address;
use crate::utils::math::{safe_add, safe_sub, Amount};
use crate::utils::validation::validate_non_zero;

/// Minted-and-outstanding stable token per account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebtLedger {
    minted: HashMap<Address, Amount>,
}

impl DebtLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding debt of `account`
    pub fn debt_of(&self, account: &Address) -> Amount {
        self.minted.get(account).copied().unwrap_or(0)
    }

    /// Add `amount` to the debt of `account`, returning the new debt
    pub fn increase(&mut self, account: Address, amount: Amount) -> Result<Amount> {
        validate_non_zero(amount)?;
        let debt = safe_add(self.debt_of(&account), amount)?;
        self.minted.insert(account, debt);
        Ok(debt)
    }

    /// Remove `amount` from the debt of `account`, returning the new debt
    pub fn decrease(&mut self, account: Address, amount: Amount) -> Result<Amount> {
        validate_non_zero(amount)?;
        let debt = safe_sub(self.debt_of(&account), amount)?;
        if debt == 0 {
            self.minted.remove(&account);
        } else {
            self.minted.insert(account, debt);
        }
        Ok(debt)
    }

    /// Copy of the entries belonging to `accounts`
    pub fn fork(&self, accounts: &[Address]) -> Self {
        let minted = accounts
            .iter()
            .filter_map(|account| self.minted.get(account).map(|debt| (*account, *debt)))
            .collect();
        Self { minted }
    }

    /// Replace the entries of `accounts` with those in `fork`
    pub fn absorb(&mut self, accounts: &[Address], fork: Self) {
        for account in accounts {
            match fork.minted.get(account) {
                Some(debt) => {
                    self.minted.insert(*account, *debt);
                }
                None => {
                    self.minted.remove(account);
                }
            }
        }
    }

    /// Total outstanding debt across accounts
    pub fn total(&self) -> Result<Amount> {
        self.minted
            .values()
            .try_fold(0, |acc, debt| safe_add(acc, *debt))
    }

    /// Number of indebted accounts
    pub fn debtor_count(&self) -> usize {
        self.minted.len()
    }
}
