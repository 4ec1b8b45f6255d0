//! Scripted engine simulations.
//!
//! A scenario file describes collateral assets with their starting prices,
//! named accounts with starting balances, and a list of steps to replay
//! against a fresh engine. Amounts and prices are human decimals
//! (`"10"`, `"0.5"`, `"2000"`). Collateral tokens use 18 decimals and prices
//! are scaled to each feed's decimals.
//!
//! ```json
//! {
//!   "collateral": [{ "symbol": "WETH", "price": "2000" }],
//!   "accounts": [{ "name": "alice", "balances": { "WETH": "10" } }],
//!   "steps": [
//!     { "action": "deposit_and_mint", "account": "alice", "token": "WETH",
//!       "collateral": "10", "mint": "5000" },
//!     { "action": "set_price", "token": "WETH", "price": "900" }
//!   ]
//! }
//! ```
//!
//! Every simulated account approves the engine for unlimited amounts of every
//! collateral token and of the stable token.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::cli::{CliError, CliResult};
use crate::core::config::EngineConfig;
use crate::core::engine::DscEngine;
use crate::core::events::EngineEvent;
use crate::error::{Error, Result};
use crate::oracle::clock::{Clock, ManualClock};
use crate::oracle::price_feed::{MockPriceFeed, PriceFeed};
use crate::token::erc20::{FungibleToken, InMemoryToken};
use crate::token::stable::StableCoin;
use crate::utils::address::Address;
use crate::utils::constants::{PRECISION_DECIMALS, TOKEN_DECIMALS};
use crate::utils::math::{format_e18, format_units, parse_units, Amount};

/// Start time used when a scenario does not set one (2024-01-01T00:00:00Z)
pub const DEFAULT_START_TIME: u64 = 1_704_067_200;

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIO FILE
// ═══════════════════════════════════════════════════════════════════════════════

/// A scripted simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Engine configuration
    #[serde(default)]
    pub config: EngineConfig,
    /// Unix time of the first step
    #[serde(default = "default_start_time")]
    pub start_time: u64,
    /// Accepted collateral assets, in registration order
    pub collateral: Vec<CollateralSetup>,
    /// Participants and their starting collateral balances
    #[serde(default)]
    pub accounts: Vec<AccountSetup>,
    /// Operations to replay
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_start_time() -> u64 {
    DEFAULT_START_TIME
}

fn default_feed_decimals() -> u8 {
    8
}

/// One collateral asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollateralSetup {
    /// Token symbol, used to reference it in steps
    pub symbol: String,
    /// Price feed decimals
    #[serde(default = "default_feed_decimals")]
    pub feed_decimals: u8,
    /// Starting USD price of one whole token
    pub price: String,
}

/// One participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSetup {
    /// Account name, used to reference it in steps
    pub name: String,
    /// Starting balance per collateral symbol
    #[serde(default)]
    pub balances: BTreeMap<String, String>,
}

/// A scripted operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Deposit collateral
    Deposit {
        /// Account name
        account: String,
        /// Collateral symbol
        token: String,
        /// Whole-token amount
        amount: String,
    },
    /// Mint stable tokens
    Mint {
        /// Account name
        account: String,
        /// Stable-token amount
        amount: String,
    },
    /// Deposit and mint atomically
    DepositAndMint {
        /// Account name
        account: String,
        /// Collateral symbol
        token: String,
        /// Collateral amount
        collateral: String,
        /// Stable-token amount
        mint: String,
    },
    /// Redeem collateral
    Redeem {
        /// Account name
        account: String,
        /// Collateral symbol
        token: String,
        /// Collateral amount
        amount: String,
    },
    /// Burn stable tokens
    Burn {
        /// Account name
        account: String,
        /// Stable-token amount
        amount: String,
    },
    /// Burn and redeem atomically
    RedeemForDsc {
        /// Account name
        account: String,
        /// Collateral symbol
        token: String,
        /// Collateral amount
        collateral: String,
        /// Stable-token amount
        burn: String,
    },
    /// Liquidate an account
    Liquidate {
        /// Liquidator name
        liquidator: String,
        /// Liquidated account name
        account: String,
        /// Collateral symbol to seize
        token: String,
        /// Stable-token debt to repay
        debt_to_cover: String,
    },
    /// Move stable tokens between accounts
    TransferDsc {
        /// Sender name
        from: String,
        /// Recipient name
        to: String,
        /// Stable-token amount
        amount: String,
    },
    /// Publish a new price round
    SetPrice {
        /// Collateral symbol
        token: String,
        /// USD price of one whole token
        price: String,
    },
    /// Move the clock forward
    AdvanceTime {
        /// Seconds to advance
        secs: u64,
    },
}

impl Step {
    /// Snake-case action name as written in scenario files
    pub fn action(&self) -> &'static str {
        match self {
            Step::Deposit { .. } => "deposit",
            Step::Mint { .. } => "mint",
            Step::DepositAndMint { .. } => "deposit_and_mint",
            Step::Redeem { .. } => "redeem",
            Step::Burn { .. } => "burn",
            Step::RedeemForDsc { .. } => "redeem_for_dsc",
            Step::Liquidate { .. } => "liquidate",
            Step::TransferDsc { .. } => "transfer_dsc",
            Step::SetPrice { .. } => "set_price",
            Step::AdvanceTime { .. } => "advance_time",
        }
    }
}

impl Scenario {
    /// Load from a JSON file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse from JSON text
    pub fn from_json(json: &str) -> CliResult<Self> {
        serde_json::from_str(json).map_err(|e| CliError::Config(e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of one replayed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Position in the scenario, starting at 1
    pub index: usize,
    /// Step action
    pub action: String,
    /// Whether the step succeeded
    pub ok: bool,
    /// What happened, or why it failed
    pub detail: String,
    /// Engine error code on failure
    pub error_code: Option<u32>,
}

/// End state of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReport {
    /// Account name
    pub name: String,
    /// Derived address
    pub address: Address,
    /// Outstanding stable-token debt
    pub debt: String,
    /// USD value of deposited collateral, or why it is unavailable
    pub collateral_usd: String,
    /// Health factor, or why it is unavailable
    pub health_factor: String,
    /// Stable tokens held
    pub dsc_balance: String,
    /// Deposited collateral per symbol
    pub deposited: BTreeMap<String, String>,
}

/// Full simulation output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Per-step outcomes in order
    pub steps: Vec<StepOutcome>,
    /// Final account states
    pub accounts: Vec<AccountReport>,
    /// Outstanding debt across all accounts
    pub total_dsc_minted: String,
    /// Events committed by the engine
    pub events: Vec<EngineEvent>,
}

impl SimulationReport {
    /// Number of failed steps
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.ok).count()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIMULATION
// ═══════════════════════════════════════════════════════════════════════════════

struct SimAsset {
    token: Arc<InMemoryToken>,
    feed: Arc<MockPriceFeed>,
    decimals: u8,
    feed_decimals: u8,
}

/// A live engine over in-memory collaborators
pub struct Simulation {
    engine: DscEngine,
    clock: Arc<ManualClock>,
    dsc: Arc<StableCoin>,
    assets: BTreeMap<String, SimAsset>,
    accounts: Vec<(String, Address)>,
}

impl Simulation {
    /// Build the engine, tokens, feeds and funded accounts of `scenario`
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let clock = Arc::new(ManualClock::new(scenario.start_time));
        let engine_address = Address::from_label("dsc-engine");
        let dsc = Arc::new(StableCoin::new(Address::from_label("dsc"), engine_address));

        let mut assets = BTreeMap::new();
        let mut tokens: Vec<Arc<dyn FungibleToken>> = Vec::new();
        let mut feeds: Vec<Arc<dyn PriceFeed>> = Vec::new();
        for setup in &scenario.collateral {
            let answer = parse_units(&setup.price, setup.feed_decimals)?;
            let token = Arc::new(
                InMemoryToken::new(Address::from_label(&setup.symbol), &setup.symbol, &setup.symbol),
            );
            let feed = Arc::new(MockPriceFeed::new(
                Address::from_label(&format!("{}/USD", setup.symbol)),
                setup.feed_decimals,
                to_answer(answer)?,
                scenario.start_time,
            ));
            tokens.push(token.clone());
            feeds.push(feed.clone());
            assets.insert(
                setup.symbol.clone(),
                SimAsset {
                    token,
                    feed,
                    decimals: TOKEN_DECIMALS,
                    feed_decimals: setup.feed_decimals,
                },
            );
        }

        let engine = DscEngine::with_config(
            engine_address,
            tokens,
            feeds,
            dsc.clone(),
            scenario.config.clone(),
            clock.clone(),
        )?;

        let mut accounts = Vec::with_capacity(scenario.accounts.len());
        for setup in &scenario.accounts {
            let address = Address::from_label(&setup.name);
            for asset in assets.values() {
                asset.token.approve(address, engine_address, Amount::MAX)?;
            }
            dsc.approve(address, engine_address, Amount::MAX)?;
            for (symbol, balance) in &setup.balances {
                let asset = asset_named(&assets, symbol)?;
                let amount = parse_units(balance, asset.decimals)?;
                if amount > 0 {
                    asset.token.mint_to(address, amount)?;
                }
            }
            accounts.push((setup.name.clone(), address));
        }

        tracing::info!(
            collateral = assets.len(),
            accounts = accounts.len(),
            "Simulation ready"
        );

        Ok(Self {
            engine,
            clock,
            dsc,
            assets,
            accounts,
        })
    }

    /// Replay every step of `scenario` on a fresh simulation
    pub fn run(scenario: &Scenario) -> Result<SimulationReport> {
        let sim = Self::new(scenario)?;
        let steps = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| sim.outcome(i + 1, step))
            .collect();
        sim.report(steps)
    }

    /// The engine under simulation
    pub fn engine(&self) -> &DscEngine {
        &self.engine
    }

    /// Apply one step, describing what happened
    pub fn apply(&self, step: &Step) -> Result<String> {
        match step {
            Step::Deposit { account, token, amount } => {
                let (user, asset) = (self.account(account)?, self.asset(token)?);
                let amount = parse_units(amount, asset.decimals)?;
                self.engine.deposit_collateral(user, asset.token.address(), amount)?;
                Ok(format!("{} deposited {} {}", account, format_units(amount, asset.decimals), token))
            }
            Step::Mint { account, amount } => {
                let user = self.account(account)?;
                let amount = parse_units(amount, PRECISION_DECIMALS)?;
                self.engine.mint_dsc(user, amount)?;
                Ok(format!("{} minted {} DSC", account, format_e18(amount)))
            }
            Step::DepositAndMint { account, token, collateral, mint } => {
                let (user, asset) = (self.account(account)?, self.asset(token)?);
                let collateral = parse_units(collateral, asset.decimals)?;
                let mint = parse_units(mint, PRECISION_DECIMALS)?;
                self.engine
                    .deposit_collateral_and_mint_dsc(user, asset.token.address(), collateral, mint)?;
                Ok(format!(
                    "{} deposited {} {} and minted {} DSC",
                    account,
                    format_units(collateral, asset.decimals),
                    token,
                    format_e18(mint)
                ))
            }
            Step::Redeem { account, token, amount } => {
                let (user, asset) = (self.account(account)?, self.asset(token)?);
                let amount = parse_units(amount, asset.decimals)?;
                self.engine.redeem_collateral(user, asset.token.address(), amount)?;
                Ok(format!("{} redeemed {} {}", account, format_units(amount, asset.decimals), token))
            }
            Step::Burn { account, amount } => {
                let user = self.account(account)?;
                let amount = parse_units(amount, PRECISION_DECIMALS)?;
                self.engine.burn_dsc(user, amount)?;
                Ok(format!("{} burned {} DSC", account, format_e18(amount)))
            }
            Step::RedeemForDsc { account, token, collateral, burn } => {
                let (user, asset) = (self.account(account)?, self.asset(token)?);
                let collateral = parse_units(collateral, asset.decimals)?;
                let burn = parse_units(burn, PRECISION_DECIMALS)?;
                self.engine
                    .redeem_collateral_for_dsc(user, asset.token.address(), collateral, burn)?;
                Ok(format!(
                    "{} burned {} DSC and redeemed {} {}",
                    account,
                    format_e18(burn),
                    format_units(collateral, asset.decimals),
                    token
                ))
            }
            Step::Liquidate { liquidator, account, token, debt_to_cover } => {
                let (by, user, asset) = (
                    self.account(liquidator)?,
                    self.account(account)?,
                    self.asset(token)?,
                );
                let debt = parse_units(debt_to_cover, PRECISION_DECIMALS)?;
                let seized = self.engine.liquidate(by, user, asset.token.address(), debt)?;
                Ok(format!(
                    "{} covered {} DSC of {} and received {} {}",
                    liquidator,
                    format_e18(debt),
                    account,
                    format_units(seized, asset.decimals),
                    token
                ))
            }
            Step::TransferDsc { from, to, amount } => {
                let (sender, recipient) = (self.account(from)?, self.account(to)?);
                let amount = parse_units(amount, PRECISION_DECIMALS)?;
                if !self.dsc.transfer(sender, recipient, amount)? {
                    return Err(Error::TransferFailed {
                        token: self.dsc.address(),
                    });
                }
                Ok(format!("{} sent {} DSC to {}", from, format_e18(amount), to))
            }
            Step::SetPrice { token, price } => {
                let asset = self.asset(token)?;
                let answer = to_answer(parse_units(price, asset.feed_decimals)?)?;
                asset.feed.update_answer_at(answer, self.clock.now())?;
                Ok(format!("{} price set to ${}", token, price))
            }
            Step::AdvanceTime { secs } => {
                self.clock.advance(*secs);
                Ok(format!("advanced clock by {}s", secs))
            }
        }
    }

    fn outcome(&self, index: usize, step: &Step) -> StepOutcome {
        match self.apply(step) {
            Ok(detail) => StepOutcome {
                index,
                action: step.action().to_string(),
                ok: true,
                detail,
                error_code: None,
            },
            Err(e) => StepOutcome {
                index,
                action: step.action().to_string(),
                ok: false,
                detail: e.to_string(),
                error_code: Some(e.code()),
            },
        }
    }

    /// Current state of every account
    pub fn report(&self, steps: Vec<StepOutcome>) -> Result<SimulationReport> {
        let accounts = self
            .accounts
            .iter()
            .map(|(name, address)| self.account_report(name, *address))
            .collect::<Result<Vec<_>>>()?;

        Ok(SimulationReport {
            steps,
            accounts,
            total_dsc_minted: format_e18(self.engine.get_total_dsc_minted()?),
            events: self.engine.events()?,
        })
    }

    fn account_report(&self, name: &str, address: Address) -> Result<AccountReport> {
        let info = self.engine.get_account_information(&address);
        let collateral_usd = match &info {
            Ok(info) => format_e18(info.collateral_value_in_usd),
            Err(e) => format!("unavailable ({})", e),
        };
        let health_factor = match self.engine.get_health_factor(&address) {
            Ok(hf) => hf.to_string(),
            Err(e) => format!("unavailable ({})", e),
        };

        let mut deposited = BTreeMap::new();
        for (symbol, asset) in &self.assets {
            let amount = self
                .engine
                .get_collateral_balance_of_user(&address, &asset.token.address())?;
            if amount > 0 {
                deposited.insert(symbol.clone(), format_units(amount, asset.decimals));
            }
        }

        let debt = match info {
            Ok(info) => info.total_dsc_minted,
            Err(_) => self.engine.get_debt_of(&address)?,
        };

        Ok(AccountReport {
            name: name.to_string(),
            address,
            debt: format_e18(debt),
            collateral_usd,
            health_factor,
            dsc_balance: format_e18(self.dsc.balance_of(&address)?),
            deposited,
        })
    }

    fn account(&self, name: &str) -> Result<Address> {
        self.accounts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, address)| *address)
            .ok_or_else(|| Error::Configuration(format!("unknown account '{}'", name)))
    }

    fn asset(&self, symbol: &str) -> Result<&SimAsset> {
        asset_named(&self.assets, symbol)
    }
}

fn asset_named<'a>(assets: &'a BTreeMap<String, SimAsset>, symbol: &str) -> Result<&'a SimAsset> {
    assets
        .get(symbol)
        .ok_or_else(|| Error::Configuration(format!("unknown collateral '{}'", symbol)))
}

fn to_answer(raw: Amount) -> Result<i128> {
    i128::try_from(raw).map_err(|_| Error::Overflow {
        operation: format!("price answer {}", raw),
    })
}
