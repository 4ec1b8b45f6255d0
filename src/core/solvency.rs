//! Health factor calculation.
//!
//! Only `LIQUIDATION_THRESHOLD / LIQUIDATION_PRECISION` (50%) of an account's
//! collateral value counts toward solvency:
//!
//! ```text
//! health_factor = (collateral_usd * 50 / 100) * 1e18 / debt
//! ```
//!
//! A health factor of `1e18` therefore means the account is exactly 200%
//! collateralized. An account without debt has [`HealthFactor::MAX`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::utils::constants::{
    LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD, MIN_HEALTH_FACTOR, PRECISION,
};
use crate::utils::math::{format_e18, mul_div, mul_div_saturating, Amount};

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH FACTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// 18-decimal solvency ratio of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HealthFactor(u128);

impl HealthFactor {
    /// Unbounded solvency (no debt)
    pub const MAX: Self = Self(u128::MAX);

    /// Lowest health factor a debtor may have
    pub const MIN: Self = Self(MIN_HEALTH_FACTOR);

    /// Wrap a raw 18-decimal value
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Raw 18-decimal value
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// At or above the minimum
    pub fn is_healthy(&self) -> bool {
        *self >= Self::MIN
    }

    /// Below the minimum: the account can be liquidated
    pub fn is_liquidatable(&self) -> bool {
        !self.is_healthy()
    }

    /// True for accounts without debt
    pub fn is_unbounded(&self) -> bool {
        *self == Self::MAX
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_e18(self.0))
    }
}

impl From<HealthFactor> for u128 {
    fn from(hf: HealthFactor) -> Self {
        hf.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALCULATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Portion of collateral value that counts toward solvency
pub fn adjusted_collateral(collateral_usd: Amount) -> Result<Amount> {
    mul_div(collateral_usd, LIQUIDATION_THRESHOLD, LIQUIDATION_PRECISION)
}

/// Health factor for `debt` (18 decimals) against `collateral_usd` (18 decimals).
///
/// Pure: callable by liquidators and off-chain monitors without touching any
/// ledger. Saturates at [`HealthFactor::MAX`] for dust debts against very
/// large collateral.
pub fn health_factor(debt: Amount, collateral_usd: Amount) -> Result<HealthFactor> {
    if debt == 0 {
        return Ok(HealthFactor::MAX);
    }
    let adjusted = adjusted_collateral(collateral_usd)?;
    let hf = mul_div_saturating(adjusted, PRECISION, debt)?;
    Ok(HealthFactor(hf))
}

/// Largest total debt `collateral_usd` can carry at the minimum health factor
pub fn max_debt_for(collateral_usd: Amount) -> Result<Amount> {
    let adjusted = adjusted_collateral(collateral_usd)?;
    mul_div(adjusted, PRECISION, MIN_HEALTH_FACTOR)
}
