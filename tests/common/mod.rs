//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use dsc_engine::prelude::*;

pub const NOW: u64 = 1_700_000_000;
pub const ETH_USD_PRICE: i128 = 2000_00000000;
pub const BTC_USD_PRICE: i128 = 30000_00000000;
pub const FEED_DECIMALS: u8 = 8;

pub const STARTING_ERC20_BALANCE: Amount = 10 * PRECISION;
pub const AMOUNT_COLLATERAL: Amount = 10 * PRECISION;
pub const AMOUNT_TO_MINT: Amount = 100 * PRECISION;

pub fn engine_address() -> Address {
    Address::from_label("dsc-engine")
}

pub fn user() -> Address {
    Address::from_label("user")
}

pub fn liquidator() -> Address {
    Address::from_label("liquidator")
}

// ═══════════════════════════════════════════════════════════════════════════════
// STANDARD DEPLOYMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// WETH and WBTC collateral, 8-decimal feeds, engine owning the stable coin
pub struct Deployment {
    pub engine: Arc<DscEngine>,
    pub dsc: Arc<StableCoin>,
    pub weth: Arc<InMemoryToken>,
    pub wbtc: Arc<InMemoryToken>,
    pub eth_usd: Arc<MockPriceFeed>,
    pub btc_usd: Arc<MockPriceFeed>,
    pub clock: Arc<ManualClock>,
}

impl Deployment {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let clock = Arc::new(ManualClock::new(NOW));
        let weth = Arc::new(InMemoryToken::new(Address::from_label("weth"), "Wrapped Ether", "WETH"));
        let wbtc = Arc::new(InMemoryToken::new(Address::from_label("wbtc"), "Wrapped Bitcoin", "WBTC"));
        let eth_usd = Arc::new(MockPriceFeed::new(
            Address::from_label("eth-usd"),
            FEED_DECIMALS,
            ETH_USD_PRICE,
            NOW,
        ));
        let btc_usd = Arc::new(MockPriceFeed::new(
            Address::from_label("btc-usd"),
            FEED_DECIMALS,
            BTC_USD_PRICE,
            NOW,
        ));
        let dsc = Arc::new(StableCoin::new(Address::from_label("dsc"), engine_address()));

        let tokens: Vec<Arc<dyn FungibleToken>> = vec![weth.clone(), wbtc.clone()];
        let feeds: Vec<Arc<dyn PriceFeed>> = vec![eth_usd.clone(), btc_usd.clone()];
        let engine = DscEngine::with_config(
            engine_address(),
            tokens,
            feeds,
            dsc.clone(),
            config,
            clock.clone(),
        )
        .unwrap();

        let deployment = Self {
            engine: Arc::new(engine),
            dsc,
            weth,
            wbtc,
            eth_usd,
            btc_usd,
            clock,
        };
        deployment.fund(user(), STARTING_ERC20_BALANCE);
        deployment
    }

    /// Give `account` WETH and unlimited engine allowances
    pub fn fund(&self, account: Address, weth: Amount) {
        if weth > 0 {
            self.weth.mint_to(account, weth).unwrap();
        }
        self.weth.approve(account, engine_address(), Amount::MAX).unwrap();
        self.wbtc.approve(account, engine_address(), Amount::MAX).unwrap();
        self.dsc.approve(account, engine_address(), Amount::MAX).unwrap();
    }

    pub fn set_eth_price(&self, answer: i128) {
        self.eth_usd.update_answer_at(answer, self.clock.now()).unwrap();
    }

    pub fn deposited_collateral(&self) {
        self.engine
            .deposit_collateral(user(), self.weth.address(), AMOUNT_COLLATERAL)
            .unwrap();
    }

    pub fn deposited_collateral_and_minted(&self) {
        self.engine
            .deposit_collateral_and_mint_dsc(user(), self.weth.address(), AMOUNT_COLLATERAL, AMOUNT_TO_MINT)
            .unwrap();
    }

    /// User at 0.9 health factor, liquidator holding enough DSC to cover it
    pub fn liquidatable(&self) {
        self.deposited_collateral_and_minted();
        self.set_eth_price(18_00000000);

        let collateral = 20 * PRECISION;
        self.fund(liquidator(), collateral);
        self.engine
            .deposit_collateral_and_mint_dsc(liquidator(), self.weth.address(), collateral, AMOUNT_TO_MINT)
            .unwrap();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MISBEHAVING COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Collateral token that calls back into the engine from `transfer_from`
pub struct ReentrantToken {
    inner: InMemoryToken,
    engine: OnceLock<Weak<DscEngine>>,
    pub reentry_results: Mutex<Vec<Result<()>>>,
    pub observed_balances: Mutex<Vec<Amount>>,
}

impl ReentrantToken {
    pub fn new(address: Address) -> Self {
        Self {
            inner: InMemoryToken::new(address, "Reentrant", "REENT"),
            engine: OnceLock::new(),
            reentry_results: Mutex::new(Vec::new()),
            observed_balances: Mutex::new(Vec::new()),
        }
    }

    pub fn attach(&self, engine: &Arc<DscEngine>) {
        let _ = self.engine.set(Arc::downgrade(engine));
    }

    pub fn mint_to(&self, to: Address, amount: Amount) {
        self.inner.mint_to(to, amount).unwrap();
    }
}

impl FungibleToken for ReentrantToken {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn total_supply(&self) -> Result<Amount> {
        self.inner.total_supply()
    }

    fn balance_of(&self, owner: &Address) -> Result<Amount> {
        self.inner.balance_of(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount> {
        self.inner.allowance(owner, spender)
    }

    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<bool> {
        self.inner.approve(owner, spender, amount)
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<bool> {
        self.inner.transfer(from, to, amount)
    }

    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: Amount) -> Result<bool> {
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            let balance = engine
                .get_collateral_balance_of_user(&from, &self.address())
                .unwrap();
            self.observed_balances.lock().unwrap().push(balance);

            let result = engine.deposit_collateral(from, self.address(), 1);
            self.reentry_results.lock().unwrap().push(result);
        }
        self.inner.transfer_from(spender, from, to, amount)
    }
}

/// Collateral token whose outbound transfers can be switched to decline
pub struct DecliningToken {
    inner: InMemoryToken,
    pub decline_transfers: AtomicBool,
}

impl DecliningToken {
    pub fn new(address: Address) -> Self {
        Self {
            inner: InMemoryToken::new(address, "Declining", "DECL"),
            decline_transfers: AtomicBool::new(false),
        }
    }

    pub fn mint_to(&self, to: Address, amount: Amount) {
        self.inner.mint_to(to, amount).unwrap();
    }
}

impl FungibleToken for DecliningToken {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn total_supply(&self) -> Result<Amount> {
        self.inner.total_supply()
    }

    fn balance_of(&self, owner: &Address) -> Result<Amount> {
        self.inner.balance_of(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount> {
        self.inner.allowance(owner, spender)
    }

    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<bool> {
        self.inner.approve(owner, spender, amount)
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<bool> {
        if self.decline_transfers.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.transfer(from, to, amount)
    }

    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: Amount) -> Result<bool> {
        self.inner.transfer_from(spender, from, to, amount)
    }
}

/// Stable token whose `mint` reports failure without reverting
pub struct FailingMintStable {
    inner: StableCoin,
}

impl FailingMintStable {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            inner: StableCoin::new(address, owner),
        }
    }
}

impl FungibleToken for FailingMintStable {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn total_supply(&self) -> Result<Amount> {
        self.inner.total_supply()
    }

    fn balance_of(&self, owner: &Address) -> Result<Amount> {
        self.inner.balance_of(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount> {
        self.inner.allowance(owner, spender)
    }

    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<bool> {
        self.inner.approve(owner, spender, amount)
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<bool> {
        self.inner.transfer(from, to, amount)
    }

    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: Amount) -> Result<bool> {
        self.inner.transfer_from(spender, from, to, amount)
    }
}

impl StableToken for FailingMintStable {
    fn owner(&self) -> Result<Address> {
        self.inner.owner()
    }

    fn mint(&self, _caller: Address, _to: Address, _amount: Amount) -> Result<bool> {
        Ok(false)
    }

    fn burn(&self, caller: Address, amount: Amount) -> Result<()> {
        self.inner.burn(caller, amount)
    }
}

/// Engine over a single collateral token with an 8-decimal $2000 feed
pub fn single_collateral_engine(
    token: Arc<dyn FungibleToken>,
    dsc: Arc<dyn StableToken>,
) -> (DscEngine, Arc<MockPriceFeed>) {
    let feed = Arc::new(MockPriceFeed::new(
        Address::from_label("eth-usd"),
        FEED_DECIMALS,
        ETH_USD_PRICE,
        NOW,
    ));
    let feeds: Vec<Arc<dyn PriceFeed>> = vec![feed.clone()];
    let engine = DscEngine::with_config(
        engine_address(),
        vec![token],
        feeds,
        dsc,
        EngineConfig::default(),
        Arc::new(ManualClock::new(NOW)),
    )
    .unwrap();
    (engine, feed)
}
