//! Price normalization and collateral valuation.
//!
//! Feeds publish prices at their own precision. The adapter rejects unusable
//! rounds and rescales every accepted answer to 18 decimals so that
//!
//! ```text
//! usd_value(amount)       = amount * price18 / 1e18
//! amount_from_usd(usd18)  = usd18 * 1e18 / price18
//! ```
//!
//! Both directions truncate exactly once, so a round trip loses at most one
//! unit of the smallest denomination.

use std::sync::Arc;

use crate::error::{Error, PriceFault, Result};
use crate::oracle::clock::{Clock, SystemClock};
use crate::oracle::price_feed::{PriceFeed, RoundData};
use crate::utils::address::Address;
use crate::utils::constants::{ORACLE_TIMEOUT_SECS, PRECISION, PRECISION_DECIMALS};
use crate::utils::math::{mul_div, pow10, safe_mul, Amount};

/// Converts between raw collateral amounts and 18-decimal USD values
#[derive(Clone)]
pub struct PriceOracleAdapter {
    clock: Arc<dyn Clock>,
    timeout_secs: u64,
}

impl std::fmt::Debug for PriceOracleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceOracleAdapter")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for PriceOracleAdapter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), ORACLE_TIMEOUT_SECS)
    }
}

impl PriceOracleAdapter {
    /// Create an adapter reading time from `clock`
    pub fn new(clock: Arc<dyn Clock>, timeout_secs: u64) -> Self {
        Self { clock, timeout_secs }
    }

    /// Maximum accepted round age in seconds
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Latest round, rejected if it has never been updated or is too old
    pub fn fresh_round(&self, token: Address, feed: &dyn PriceFeed) -> Result<RoundData> {
        let round = feed.latest_round_data()?;
        if round.updated_at == 0 {
            return Err(price_fault(token, PriceFault::NeverUpdated));
        }
        let age = self.clock.now().saturating_sub(round.updated_at);
        if age > self.timeout_secs {
            tracing::warn!(
                token = %token.short(),
                age,
                max_age = self.timeout_secs,
                "Rejecting stale price round"
            );
            return Err(price_fault(
                token,
                PriceFault::Stale {
                    age,
                    max_age: self.timeout_secs,
                },
            ));
        }
        Ok(round)
    }

    /// Current USD price of one whole unit of `token`, scaled to 18 decimals
    pub fn normalized_price(&self, token: Address, feed: &dyn PriceFeed) -> Result<Amount> {
        let round = self.fresh_round(token, feed)?;
        if round.answer <= 0 {
            tracing::warn!(token = %token.short(), answer = round.answer, "Feed answered a non-positive price");
            return Err(price_fault(token, PriceFault::NonPositive(round.answer)));
        }
        let raw = round.answer as u128;
        let decimals = feed.decimals();

        let price = if decimals <= PRECISION_DECIMALS {
            safe_mul(raw, pow10(u32::from(PRECISION_DECIMALS - decimals))?)?
        } else {
            raw / pow10(u32::from(decimals - PRECISION_DECIMALS))?
        };

        if price == 0 {
            return Err(price_fault(token, PriceFault::NonPositive(0)));
        }
        Ok(price)
    }

    /// USD value (18 decimals) of `amount` units of `token`
    pub fn usd_value(&self, token: Address, feed: &dyn PriceFeed, amount: Amount) -> Result<Amount> {
        let price = self.normalized_price(token, feed)?;
        mul_div(amount, price, PRECISION)
    }

    /// Amount of `token` worth `usd_amount` (18 decimals)
    pub fn amount_from_usd(
        &self,
        token: Address,
        feed: &dyn PriceFeed,
        usd_amount: Amount,
    ) -> Result<Amount> {
        let price = self.normalized_price(token, feed)?;
        mul_div(usd_amount, PRECISION, price)
    }
}

fn price_fault(token: Address, reason: PriceFault) -> Error {
    Error::PriceUnavailable { token, reason }
}
