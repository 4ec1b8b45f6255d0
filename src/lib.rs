//! # DSC Engine
//!
//! Accounting core of a decentralized, over-collateralized stablecoin pegged
//! to one US dollar. Users deposit approved collateral tokens, mint the
//! stable token (DSC) against them, repay by burning, and redeem collateral.
//! Positions whose health factor drops below 1 can be liquidated by anyone
//! for a bonus paid in collateral.
//!
//! ## Architecture
//!
//! - **Core**: the engine, its ledgers, solvency math and atomic execution
//! - **Oracle**: price feed interface and staleness-checked normalization
//! - **Token**: fungible and mintable stable token interfaces with in-memory
//!   implementations
//! - **CLI**: offline tooling and scenario replay
//!
//! ## Example
//!
//! ```rust,ignore
//! use dsc_engine::prelude::*;
//!
//! let engine = DscEngine::new(engine_address, vec![weth], vec![eth_usd], dsc)?;
//! engine.deposit_collateral_and_mint_dsc(user, weth_address, 10 * PRECISION, 100 * PRECISION)?;
//! assert!(engine.get_health_factor(&user)?.is_healthy());
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod cli;
pub mod core;
pub mod error;
pub mod oracle;
pub mod token;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        config::EngineConfig,
        engine::{AccountInformation, DscEngine},
        events::EngineEvent,
        solvency::HealthFactor,
    };
    pub use crate::error::{Error, PriceFault, Result};
    pub use crate::oracle::{
        clock::{Clock, ManualClock, SystemClock},
        price_feed::{MockPriceFeed, PriceFeed, RoundData},
    };
    pub use crate::token::{
        erc20::{FungibleToken, InMemoryToken},
        stable::{StableCoin, StableToken},
    };
    pub use crate::utils::{address::Address, constants::PRECISION, math::Amount};
}

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "DSC";
