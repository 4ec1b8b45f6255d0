//! Collateral registry and per-account collateral ledger.
//!
//! The registry is fixed at construction: an ordered list of accepted tokens,
//! each paired with the price feed that values it. The ledger records how
//! much of each accepted token every account has deposited with the engine.
//!
//! Ledgers can be forked for a set of accounts. Operations mutate the fork
//! and the engine absorbs it back only once the whole operation succeeded.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::oracle::price_feed::PriceFeed;
use crate::token::erc20::FungibleToken;
use crate::utils::address::Address;
use crate::utils::constants::TOKEN_DECIMALS;
use crate::utils::math::{safe_add, safe_sub, Amount};
use crate::utils::validation::{validate_address, validate_non_zero, validate_registry_lengths};

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// An accepted collateral token and its price feed
#[derive(Clone)]
pub struct CollateralAsset {
    /// Token handle used for custody transfers
    pub token: Arc<dyn FungibleToken>,
    /// USD price source for the token
    pub feed: Arc<dyn PriceFeed>,
}

impl std::fmt::Debug for CollateralAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollateralAsset")
            .field("token", &self.token.address())
            .field("feed", &self.feed.address())
            .finish()
    }
}

/// Immutable token → price feed mapping
///
/// Every collateral token must use 18 decimals.
#[derive(Debug, Clone)]
pub struct CollateralRegistry {
    order: Vec<Address>,
    assets: HashMap<Address, CollateralAsset>,
}

impl CollateralRegistry {
    /// Pair `tokens[i]` with `feeds[i]`
    pub fn new(
        tokens: Vec<Arc<dyn FungibleToken>>,
        feeds: Vec<Arc<dyn PriceFeed>>,
    ) -> Result<Self> {
        validate_registry_lengths(tokens.len(), feeds.len())?;

        let mut order = Vec::with_capacity(tokens.len());
        let mut assets = HashMap::with_capacity(tokens.len());

        for (token, feed) in tokens.into_iter().zip(feeds) {
            let address = token.address();
            validate_address(&address, "collateral token")?;
            validate_address(&feed.address(), "price feed")?;
            if token.decimals() != TOKEN_DECIMALS {
                return Err(Error::Configuration(format!(
                    "collateral token {} has {} decimals, expected {}",
                    address,
                    token.decimals(),
                    TOKEN_DECIMALS
                )));
            }
            if assets.contains_key(&address) {
                return Err(Error::Configuration(format!(
                    "collateral token {} registered twice",
                    address
                )));
            }
            order.push(address);
            assets.insert(address, CollateralAsset { token, feed });
        }

        Ok(Self { order, assets })
    }

    /// Accepted tokens in registration order
    pub fn tokens(&self) -> &[Address] {
        &self.order
    }

    /// Whether `token` is accepted as collateral
    pub fn is_supported(&self, token: &Address) -> bool {
        self.assets.contains_key(token)
    }

    /// Asset entry for `token`
    pub fn asset(&self, token: &Address) -> Result<&CollateralAsset> {
        self.assets.get(token).ok_or(Error::UnsupportedToken(*token))
    }

    /// Price feed registered for `token`
    pub fn feed_for(&self, token: &Address) -> Result<&Arc<dyn PriceFeed>> {
        self.asset(token).map(|asset| &asset.feed)
    }

    /// Number of accepted tokens
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no collateral is accepted
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Deposited collateral per account per token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollateralLedger {
    deposits: HashMap<Address, BTreeMap<Address, Amount>>,
}

impl CollateralLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount of `token` deposited by `account`
    pub fn balance_of(&self, account: &Address, token: &Address) -> Amount {
        self.deposits
            .get(account)
            .and_then(|tokens| tokens.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// Non-zero balances held by `account`
    pub fn balances_of(&self, account: &Address) -> impl Iterator<Item = (&Address, &Amount)> {
        self.deposits.get(account).into_iter().flatten()
    }

    /// Credit `amount` of `token` to `account`, returning the new balance
    pub fn deposit(
        &mut self,
        registry: &CollateralRegistry,
        account: Address,
        token: Address,
        amount: Amount,
    ) -> Result<Amount> {
        validate_non_zero(amount)?;
        if !registry.is_supported(&token) {
            return Err(Error::UnsupportedToken(token));
        }
        let balance = safe_add(self.balance_of(&account, &token), amount)?;
        self.set(account, token, balance);
        Ok(balance)
    }

    /// Debit `amount` of `token` from `account`, returning the new balance
    pub fn withdraw(&mut self, account: Address, token: Address, amount: Amount) -> Result<Amount> {
        validate_non_zero(amount)?;
        let balance = safe_sub(self.balance_of(&account, &token), amount)?;
        self.set(account, token, balance);
        Ok(balance)
    }

    /// Copy of the entries belonging to `accounts`
    pub fn fork(&self, accounts: &[Address]) -> Self {
        let deposits = accounts
            .iter()
            .filter_map(|account| {
                self.deposits
                    .get(account)
                    .map(|tokens| (*account, tokens.clone()))
            })
            .collect();
        Self { deposits }
    }

    /// Replace the entries of `accounts` with those in `fork`
    pub fn absorb(&mut self, accounts: &[Address], fork: Self) {
        for account in accounts {
            match fork.deposits.get(account) {
                Some(tokens) => {
                    self.deposits.insert(*account, tokens.clone());
                }
                None => {
                    self.deposits.remove(account);
                }
            }
        }
    }

    /// Number of accounts with at least one deposit
    pub fn account_count(&self) -> usize {
        self.deposits.len()
    }

    /// Sum of all deposits of `token` across accounts
    pub fn total_of(&self, token: &Address) -> Result<Amount> {
        self.deposits
            .values()
            .filter_map(|tokens| tokens.get(token))
            .try_fold(0, |acc, amount| safe_add(acc, *amount))
    }

    fn set(&mut self, account: Address, token: Address, balance: Amount) {
        if balance == 0 {
            if let Some(tokens) = self.deposits.get_mut(&account) {
                tokens.remove(&token);
                if tokens.is_empty() {
                    self.deposits.remove(&account);
                }
            }
        } else {
            self.deposits.entry(account).or_default().insert(token, balance);
        }
    }
}
