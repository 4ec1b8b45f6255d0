//! Fixed-point arithmetic and mathematical utilities.
//!
//! Amounts are `u128`. Any product that can exceed 128 bits goes through a
//! 256-bit intermediate so the only precision loss is the single truncating
//! division at the end.

use primitive_types::U256;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::utils::constants::PRECISION_DECIMALS;

/// Token amounts, USD values and health factors
pub type Amount = u128;

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe subtraction, reporting the shortfall as an insufficient balance
pub fn safe_sub(available: Amount, required: Amount) -> Result<Amount> {
    available
        .checked_sub(required)
        .ok_or(Error::InsufficientBalance { required, available })
}

/// Safe multiplication with overflow check
pub fn safe_mul(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_mul(b).ok_or(Error::Overflow {
        operation: format!("{} * {}", a, b),
    })
}

/// Computes `(a * b) / c` with a 256-bit intermediate, truncating once
pub fn mul_div(a: Amount, b: Amount, c: Amount) -> Result<Amount> {
    if c == 0 {
        return Err(Error::DivisionByZero {
            operation: format!("({} * {}) / 0", a, b),
        });
    }
    let result = U256::from(a) * U256::from(b) / U256::from(c);
    to_amount(result, || format!("({} * {}) / {}", a, b, c))
}

/// Computes `(a * b) / c`, saturating at `Amount::MAX` instead of failing
pub fn mul_div_saturating(a: Amount, b: Amount, c: Amount) -> Result<Amount> {
    match mul_div(a, b, c) {
        Err(Error::Overflow { .. }) => Ok(Amount::MAX),
        other => other,
    }
}

/// `10^exp` as an amount
pub fn pow10(exp: u32) -> Result<Amount> {
    10u128.checked_pow(exp).ok_or(Error::Overflow {
        operation: format!("10^{}", exp),
    })
}

fn to_amount(value: U256, operation: impl FnOnce() -> String) -> Result<Amount> {
    if value > U256::from(Amount::MAX) {
        return Err(Error::Overflow {
            operation: operation(),
        });
    }
    Ok(value.low_u128())
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISPLAY HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Render an 18-decimal value (USD or health factor) for humans.
///
/// `Amount::MAX` renders as `max`, the unbounded health factor.
pub fn format_e18(value: Amount) -> String {
    if value == Amount::MAX {
        return "max".to_string();
    }
    format_units(value, PRECISION_DECIMALS)
}

/// Render `value` base units with `decimals` decimal places.
///
/// Values too large for `Decimal` fall back to the raw integer.
pub fn format_units(value: Amount, decimals: u8) -> String {
    match i128::try_from(value)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, u32::from(decimals)).ok())
    {
        Some(decimal) => decimal.normalize().to_string(),
        None => format!("{}e-{}", value, decimals),
    }
}

/// Parse a human decimal such as `"2000.5"` into base units with `decimals`
/// decimal places. Rejects negatives and more fractional digits than fit.
pub fn parse_units(input: &str, decimals: u8) -> Result<Amount> {
    let invalid = |reason: &str| Error::Configuration(format!("invalid amount '{}': {}", input, reason));

    let value = Decimal::from_str_exact(input.trim())
        .map_err(|e| invalid(&e.to_string()))?
        .normalize();
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("negative"));
    }

    let scale = value.scale();
    if scale > u32::from(decimals) {
        return Err(invalid("too many decimal places"));
    }
    let mantissa: Amount = value.mantissa().unsigned_abs();
    safe_mul(mantissa, pow10(u32::from(decimals) - scale)?)
}
