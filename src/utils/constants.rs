//! Protocol constants.
//!
//! All protocol-wide constants are defined here for easy auditing. They are
//! exposed unchanged through the engine's getters so off-chain tooling can
//! verify them.

// ═══════════════════════════════════════════════════════════════════════════════
// PRECISION CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed-point scale for USD values, prices and health factors (1e18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Decimals carried by every normalized price and USD value
pub const PRECISION_DECIMALS: u8 = 18;

/// Precision of the usual USD price feed (8 decimals)
pub const FEED_PRECISION: u128 = 100_000_000;

/// Scales an 8-decimal feed answer up to 18 decimals
pub const ADDITIONAL_FEED_PRECISION: u128 = 10_000_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// SOLVENCY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Percentage of collateral value that counts toward solvency (50%)
pub const LIQUIDATION_THRESHOLD: u128 = 50;

/// Denominator for threshold and bonus percentages
pub const LIQUIDATION_PRECISION: u128 = 100;

/// Extra collateral paid to liquidators, in percent (10%)
pub const LIQUIDATION_BONUS: u128 = 10;

/// Minimum health factor; below this an account is liquidatable
pub const MIN_HEALTH_FACTOR: u128 = PRECISION;

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum age of a price round before it is considered stale (3 hours)
pub const ORACLE_TIMEOUT_SECS: u64 = 3 * 60 * 60;

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Decimals of the stable token and of collateral tokens by default
pub const TOKEN_DECIMALS: u8 = 18;

/// Number of events retained in the engine's event log
pub const DEFAULT_MAX_EVENTS: usize = 1000;

/// Length of an account or contract address in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a hash in bytes
pub const HASH_LENGTH: usize = 32;
