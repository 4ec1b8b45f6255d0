//! The DSC engine.
//!
//! Users lock registered collateral with the engine and mint the stable
//! token against it as debt. The engine is the only writer of the
//! collateral and debt ledgers and holds the stable token's mint/burn
//! capability.
//!
//! ## Operation lifecycle
//!
//! Every mutating call runs the same way:
//! 1. Enter the reentrancy lock; a nested mutating call fails.
//! 2. Fork the committed ledger entries of the accounts involved.
//! 3. Apply ledger changes to the fork and perform compensable token
//!    interactions (pulls, burns) through a [`Journal`].
//! 4. Check solvency against the fork with fresh prices.
//! 5. Run the single irreversible interaction (collateral out or mint).
//! 6. Absorb the fork into the committed ledgers and record events.
//!
//! A failure at any step unwinds the journal and drops the fork, so a failed
//! call leaves ledgers and token balances exactly as before. Queries only
//! ever see committed state.

use std::sync::{Arc, RwLock};

use crate::core::collateral::{CollateralLedger, CollateralRegistry};
use crate::core::config::EngineConfig;
use crate::core::debt::DebtLedger;
use crate::core::events::{EngineEvent, EventLog};
use crate::core::guard::ReentrancyLock;
use crate::core::journal::{FinalStep, Journal};
use crate::core::solvency::{self, HealthFactor};
use crate::error::{Error, Result};
use crate::oracle::adapter::PriceOracleAdapter;
use crate::oracle::clock::{Clock, SystemClock};
use crate::oracle::price_feed::PriceFeed;
use crate::token::erc20::FungibleToken;
use crate::token::stable::StableToken;
use crate::utils::address::Address;
use crate::utils::constants::{
    ADDITIONAL_FEED_PRECISION, FEED_PRECISION, LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD,
    MIN_HEALTH_FACTOR, PRECISION,
};
use crate::utils::math::{mul_div, safe_add, Amount};
use crate::utils::validation::{validate_address, validate_non_zero};

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
struct Ledgers {
    collateral: CollateralLedger,
    debt: DebtLedger,
}

impl Ledgers {
    fn fork(&self, accounts: &[Address]) -> Self {
        Self {
            collateral: self.collateral.fork(accounts),
            debt: self.debt.fork(accounts),
        }
    }

    fn absorb(&mut self, accounts: &[Address], fork: Self) {
        self.collateral.absorb(accounts, fork.collateral);
        self.debt.absorb(accounts, fork.debt);
    }
}

/// Staged state of one in-flight operation
struct Staging {
    ledgers: Ledgers,
    journal: Journal,
    events: Vec<EngineEvent>,
}

/// Account summary returned by [`DscEngine::get_account_information`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccountInformation {
    /// Outstanding stable-token debt (18 decimals)
    pub total_dsc_minted: Amount,
    /// USD value of all deposited collateral (18 decimals)
    pub collateral_value_in_usd: Amount,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Collateral-backed stable token engine
pub struct DscEngine {
    address: Address,
    registry: CollateralRegistry,
    dsc: Arc<dyn StableToken>,
    oracle: PriceOracleAdapter,
    config: EngineConfig,
    ledgers: RwLock<Ledgers>,
    events: RwLock<EventLog>,
    lock: ReentrancyLock,
}

impl std::fmt::Debug for DscEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DscEngine")
            .field("address", &self.address)
            .field("registry", &self.registry)
            .field("dsc", &self.dsc.address())
            .field("config", &self.config)
            .finish()
    }
}

impl DscEngine {
    /// Create an engine with default configuration and the system clock.
    ///
    /// `collateral_tokens[i]` is priced by `price_feeds[i]`. The engine must be
    /// made owner of `dsc` before anything can be minted.
    pub fn new(
        address: Address,
        collateral_tokens: Vec<Arc<dyn FungibleToken>>,
        price_feeds: Vec<Arc<dyn PriceFeed>>,
        dsc: Arc<dyn StableToken>,
    ) -> Result<Self> {
        Self::with_config(
            address,
            collateral_tokens,
            price_feeds,
            dsc,
            EngineConfig::default(),
            Arc::new(SystemClock),
        )
    }

    /// Create an engine with explicit configuration and clock
    pub fn with_config(
        address: Address,
        collateral_tokens: Vec<Arc<dyn FungibleToken>>,
        price_feeds: Vec<Arc<dyn PriceFeed>>,
        dsc: Arc<dyn StableToken>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let registry = CollateralRegistry::new(collateral_tokens, price_feeds)?;
        config.validate()?;
        validate_address(&address, "engine")?;
        validate_address(&dsc.address(), "stable token")?;

        tracing::info!(
            engine = %address.short(),
            dsc = %dsc.address().short(),
            collateral_tokens = registry.len(),
            oracle_timeout_secs = config.oracle_timeout_secs,
            liquidation_bonus = config.liquidation_bonus,
            "DSC engine initialized"
        );

        Ok(Self {
            address,
            oracle: PriceOracleAdapter::new(clock, config.oracle_timeout_secs),
            events: RwLock::new(EventLog::new(config.max_events)),
            registry,
            dsc,
            config,
            ledgers: RwLock::new(Ledgers::default()),
            lock: ReentrancyLock::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit `amount` of `token` as collateral.
    ///
    /// The caller must have approved the engine to move the tokens.
    pub fn deposit_collateral(&self, caller: Address, token: Address, amount: Amount) -> Result<()> {
        validate_non_zero(amount)?;
        self.registry.asset(&token)?;

        self.transact("deposit_collateral", &[caller], |staging| {
            self.stage_deposit(staging, caller, token, amount)?;
            Ok(((), None))
        })
    }

    /// Mint `amount` stable tokens to the caller as new debt
    pub fn mint_dsc(&self, caller: Address, amount: Amount) -> Result<()> {
        validate_non_zero(amount)?;

        self.transact("mint_dsc", &[caller], |staging| {
            let step = self.stage_mint(staging, caller, amount)?;
            Ok(((), Some(step)))
        })
    }

    /// Deposit collateral and mint against it in one atomic call
    pub fn deposit_collateral_and_mint_dsc(
        &self,
        caller: Address,
        token: Address,
        collateral_amount: Amount,
        amount_dsc_to_mint: Amount,
    ) -> Result<()> {
        validate_non_zero(collateral_amount)?;
        validate_non_zero(amount_dsc_to_mint)?;
        self.registry.asset(&token)?;

        self.transact("deposit_collateral_and_mint_dsc", &[caller], |staging| {
            self.stage_deposit(staging, caller, token, collateral_amount)?;
            let step = self.stage_mint(staging, caller, amount_dsc_to_mint)?;
            Ok(((), Some(step)))
        })
    }

    /// Withdraw `amount` of `token` back to the caller.
    ///
    /// Fails with [`Error::BreaksHealthFactor`] if the remaining collateral no
    /// longer covers the caller's debt.
    pub fn redeem_collateral(&self, caller: Address, token: Address, amount: Amount) -> Result<()> {
        validate_non_zero(amount)?;
        self.registry.asset(&token)?;

        self.transact("redeem_collateral", &[caller], |staging| {
            let step = self.stage_redeem(staging, caller, caller, token, amount)?;
            self.ensure_healthy(&staging.ledgers, &caller)?;
            Ok(((), Some(step)))
        })
    }

    /// Burn `amount` of the caller's stable tokens to repay debt.
    ///
    /// The caller must have approved the engine to move the stable tokens.
    pub fn burn_dsc(&self, caller: Address, amount: Amount) -> Result<()> {
        validate_non_zero(amount)?;

        self.transact("burn_dsc", &[caller], |staging| {
            self.stage_burn(staging, amount, caller, caller)?;
            Ok(((), None))
        })
    }

    /// Burn stable tokens and withdraw collateral in one atomic call
    pub fn redeem_collateral_for_dsc(
        &self,
        caller: Address,
        token: Address,
        collateral_amount: Amount,
        amount_dsc_to_burn: Amount,
    ) -> Result<()> {
        validate_non_zero(collateral_amount)?;
        validate_non_zero(amount_dsc_to_burn)?;
        self.registry.asset(&token)?;

        self.transact("redeem_collateral_for_dsc", &[caller], |staging| {
            self.stage_burn(staging, amount_dsc_to_burn, caller, caller)?;
            let step = self.stage_redeem(staging, caller, caller, token, collateral_amount)?;
            self.ensure_healthy(&staging.ledgers, &caller)?;
            Ok(((), Some(step)))
        })
    }

    /// Repay `debt_to_cover` of an undercollateralized `account`'s debt.
    ///
    /// The liquidator receives collateral of `token` worth `debt_to_cover`
    /// plus the configured bonus. The account's health factor must strictly
    /// improve and the liquidator's own position must stay healthy.
    /// Returns the amount of collateral paid out.
    pub fn liquidate(
        &self,
        liquidator: Address,
        account: Address,
        token: Address,
        debt_to_cover: Amount,
    ) -> Result<Amount> {
        validate_non_zero(debt_to_cover)?;
        let asset = self.registry.asset(&token)?.clone();

        self.transact("liquidate", &[account, liquidator], |staging| {
            let starting = self.health_factor_in(&staging.ledgers, &account)?;
            if starting.is_healthy() {
                return Err(Error::HealthFactorOk);
            }

            let covered = self
                .oracle
                .amount_from_usd(token, asset.feed.as_ref(), debt_to_cover)?;
            let bonus = mul_div(covered, self.config.liquidation_bonus, LIQUIDATION_PRECISION)?;
            let seized = safe_add(covered, bonus)?;

            let step = self.stage_redeem(staging, account, liquidator, token, seized)?;
            self.stage_burn(staging, debt_to_cover, account, liquidator)?;

            let ending = self.health_factor_in(&staging.ledgers, &account)?;
            if ending <= starting {
                tracing::warn!(
                    account = %account.short(),
                    starting = %starting,
                    ending = %ending,
                    "Liquidation would not improve health factor"
                );
                return Err(Error::HealthFactorNotImproved);
            }
            self.ensure_healthy(&staging.ledgers, &liquidator)?;

            staging.events.push(EngineEvent::Liquidated {
                user: account,
                liquidator,
                token,
                debt_covered: debt_to_cover,
                collateral_seized: seized,
            });
            Ok((seized, Some(step)))
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STAGED STEPS
    // ═══════════════════════════════════════════════════════════════════════════

    fn stage_deposit(
        &self,
        staging: &mut Staging,
        account: Address,
        token: Address,
        amount: Amount,
    ) -> Result<()> {
        let asset = self.registry.asset(&token)?;
        staging
            .ledgers
            .collateral
            .deposit(&self.registry, account, token, amount)?;
        staging.journal.pull(&asset.token, account, amount)?;
        staging.events.push(EngineEvent::CollateralDeposited {
            user: account,
            token,
            amount,
        });
        Ok(())
    }

    fn stage_mint(&self, staging: &mut Staging, account: Address, amount: Amount) -> Result<FinalStep> {
        staging.ledgers.debt.increase(account, amount)?;
        self.ensure_healthy(&staging.ledgers, &account)?;
        staging.events.push(EngineEvent::DscMinted {
            user: account,
            amount,
        });
        Ok(FinalStep::Mint { to: account, amount })
    }

    fn stage_redeem(
        &self,
        staging: &mut Staging,
        from: Address,
        to: Address,
        token: Address,
        amount: Amount,
    ) -> Result<FinalStep> {
        let asset = self.registry.asset(&token)?;
        staging.ledgers.collateral.withdraw(from, token, amount)?;
        staging.events.push(EngineEvent::CollateralRedeemed {
            from,
            to,
            token,
            amount,
        });
        Ok(FinalStep::Send {
            token: Arc::clone(&asset.token),
            to,
            amount,
        })
    }

    fn stage_burn(
        &self,
        staging: &mut Staging,
        amount: Amount,
        on_behalf_of: Address,
        from: Address,
    ) -> Result<()> {
        staging.ledgers.debt.decrease(on_behalf_of, amount)?;
        staging.journal.pull(&self.dsc, from, amount)?;
        staging.journal.burn(amount)?;
        staging.events.push(EngineEvent::DscBurned {
            on_behalf_of,
            from,
            amount,
        });
        Ok(())
    }

    /// Run `operation` against a fork of `accounts`, committing only on success
    fn transact<T>(
        &self,
        name: &'static str,
        accounts: &[Address],
        operation: impl FnOnce(&mut Staging) -> Result<(T, Option<FinalStep>)>,
    ) -> Result<T> {
        let _guard = self.lock.enter()?;

        let mut accounts = accounts.to_vec();
        accounts.sort();
        accounts.dedup();

        let mut staging = Staging {
            ledgers: self.snapshot(&accounts)?,
            journal: Journal::new(self.address, Arc::clone(&self.dsc)),
            events: Vec::new(),
        };

        let (value, step) = match operation(&mut staging) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(operation = name, error = %e, "Operation rejected");
                return Err(staging.journal.unwind(e));
            }
        };

        let Staging {
            ledgers,
            journal,
            events,
        } = staging;
        journal.settle(step)?;

        {
            let mut committed = self.ledgers.write().map_err(|_| Error::Lock)?;
            committed.absorb(&accounts, ledgers);
        }

        for event in &events {
            tracing::info!(operation = name, account = %event.account().short(), event = ?event, "Committed");
        }
        self.events.write().map_err(|_| Error::Lock)?.extend(events);

        Ok(value)
    }

    fn snapshot(&self, accounts: &[Address]) -> Result<Ledgers> {
        let ledgers = self.ledgers.read().map_err(|_| Error::Lock)?;
        Ok(ledgers.fork(accounts))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SOLVENCY
    // ═══════════════════════════════════════════════════════════════════════════

    fn collateral_value_in(&self, ledgers: &Ledgers, account: &Address) -> Result<Amount> {
        let mut total: Amount = 0;
        for token in self.registry.tokens() {
            let amount = ledgers.collateral.balance_of(account, token);
            if amount == 0 {
                continue;
            }
            let feed = self.registry.feed_for(token)?;
            let value = self.oracle.usd_value(*token, feed.as_ref(), amount)?;
            total = safe_add(total, value)?;
        }
        Ok(total)
    }

    fn health_factor_in(&self, ledgers: &Ledgers, account: &Address) -> Result<HealthFactor> {
        let debt = ledgers.debt.debt_of(account);
        let collateral_usd = self.collateral_value_in(ledgers, account)?;
        let hf = solvency::health_factor(debt, collateral_usd)?;
        tracing::debug!(
            account = %account.short(),
            debt,
            collateral_usd,
            health_factor = %hf,
            "Computed health factor"
        );
        Ok(hf)
    }

    fn ensure_healthy(&self, ledgers: &Ledgers, account: &Address) -> Result<()> {
        let hf = self.health_factor_in(ledgers, account)?;
        if !hf.is_healthy() {
            tracing::warn!(account = %account.short(), health_factor = %hf, "Health factor broken");
            return Err(Error::BreaksHealthFactor(hf.raw()));
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Debt and collateral value of `account`
    pub fn get_account_information(&self, account: &Address) -> Result<AccountInformation> {
        let ledgers = self.snapshot(&[*account])?;
        Ok(AccountInformation {
            total_dsc_minted: ledgers.debt.debt_of(account),
            collateral_value_in_usd: self.collateral_value_in(&ledgers, account)?,
        })
    }

    /// Current health factor of `account`
    pub fn get_health_factor(&self, account: &Address) -> Result<HealthFactor> {
        let ledgers = self.snapshot(&[*account])?;
        self.health_factor_in(&ledgers, account)
    }

    /// USD value of all collateral `account` has deposited
    pub fn get_account_collateral_value(&self, account: &Address) -> Result<Amount> {
        let ledgers = self.snapshot(&[*account])?;
        self.collateral_value_in(&ledgers, account)
    }

    /// Outstanding stable-token debt of `account`; needs no price
    pub fn get_debt_of(&self, account: &Address) -> Result<Amount> {
        let ledgers = self.ledgers.read().map_err(|_| Error::Lock)?;
        Ok(ledgers.debt.debt_of(account))
    }

    /// Health factor for arbitrary figures, without touching any ledger
    pub fn calculate_health_factor(
        &self,
        total_dsc_minted: Amount,
        collateral_value_in_usd: Amount,
    ) -> Result<HealthFactor> {
        solvency::health_factor(total_dsc_minted, collateral_value_in_usd)
    }

    /// USD value (18 decimals) of `amount` units of `token`
    pub fn get_usd_value(&self, token: &Address, amount: Amount) -> Result<Amount> {
        let feed = self.registry.feed_for(token)?;
        self.oracle.usd_value(*token, feed.as_ref(), amount)
    }

    /// Amount of `token` worth `usd_amount` (18 decimals)
    pub fn get_token_amount_from_usd(&self, token: &Address, usd_amount: Amount) -> Result<Amount> {
        let feed = self.registry.feed_for(token)?;
        self.oracle.amount_from_usd(*token, feed.as_ref(), usd_amount)
    }

    /// Collateral of `token` deposited by `account`
    pub fn get_collateral_balance_of_user(&self, account: &Address, token: &Address) -> Result<Amount> {
        let ledgers = self.ledgers.read().map_err(|_| Error::Lock)?;
        Ok(ledgers.collateral.balance_of(account, token))
    }

    /// Registered collateral tokens in registration order
    pub fn get_collateral_tokens(&self) -> Vec<Address> {
        self.registry.tokens().to_vec()
    }

    /// Price feed registered for `token`
    pub fn get_collateral_token_price_feed(&self, token: &Address) -> Result<Address> {
        Ok(self.registry.feed_for(token)?.address())
    }

    /// Total outstanding debt across all accounts
    pub fn get_total_dsc_minted(&self) -> Result<Amount> {
        let ledgers = self.ledgers.read().map_err(|_| Error::Lock)?;
        ledgers.debt.total()
    }

    /// Address of the stable token the engine mints
    pub fn get_dsc(&self) -> Address {
        self.dsc.address()
    }

    /// Address the engine acts as in token calls
    pub fn address(&self) -> Address {
        self.address
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Committed events, oldest first
    pub fn events(&self) -> Result<Vec<EngineEvent>> {
        Ok(self.events.read().map_err(|_| Error::Lock)?.snapshot())
    }

    /// Remove and return committed events
    pub fn drain_events(&self) -> Result<Vec<EngineEvent>> {
        Ok(self.events.write().map_err(|_| Error::Lock)?.drain())
    }

    // Protocol constants

    /// Minimum health factor (1e18)
    pub fn get_min_health_factor(&self) -> u128 {
        MIN_HEALTH_FACTOR
    }

    /// Percentage of collateral value counted toward solvency
    pub fn get_liquidation_threshold(&self) -> u128 {
        LIQUIDATION_THRESHOLD
    }

    /// Denominator of threshold and bonus percentages
    pub fn get_liquidation_precision(&self) -> u128 {
        LIQUIDATION_PRECISION
    }

    /// Liquidator bonus percentage
    pub fn get_liquidation_bonus(&self) -> u128 {
        self.config.liquidation_bonus
    }

    /// Fixed-point precision (1e18)
    pub fn get_precision(&self) -> u128 {
        PRECISION
    }

    /// Precision of an 8-decimal feed
    pub fn get_feed_precision(&self) -> u128 {
        FEED_PRECISION
    }

    /// Scale from an 8-decimal feed price to 18 decimals
    pub fn get_additional_feed_precision(&self) -> u128 {
        ADDITIONAL_FEED_PRECISION
    }
}
