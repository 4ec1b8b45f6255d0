//! Error types for the DSC engine.
//!
//! Every failure aborts the whole operation and leaves the ledgers exactly as
//! they were before the call. Variants carry structured payloads so callers can
//! branch on the failure kind instead of parsing messages.

use thiserror::Error;

use crate::utils::address::Address;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a price could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceFault {
    /// The feed answered zero or a negative price
    NonPositive(i128),
    /// The latest round is older than the configured timeout
    Stale {
        /// Seconds since the round was updated
        age: u64,
        /// Maximum allowed age in seconds
        max_age: u64,
    },
    /// The feed has never been updated
    NeverUpdated,
}

impl std::fmt::Display for PriceFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceFault::NonPositive(answer) => write!(f, "non-positive answer {}", answer),
            PriceFault::Stale { age, max_age } => {
                write!(f, "stale round: updated {}s ago, max allowed {}s", age, max_age)
            }
            PriceFault::NeverUpdated => write!(f, "feed has never been updated"),
        }
    }
}

/// Main error type for the DSC engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Amount must be greater than zero
    #[error("Amount must be more than zero")]
    InvalidAmount,

    /// Token is not a registered collateral asset
    #[error("Token not allowed as collateral: {0}")]
    UnsupportedToken(Address),

    /// Mint or transfer addressed to the zero address
    #[error("Invalid recipient: zero address")]
    ZeroAddress,

    // ═══════════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Token and price feed lists differ in length
    #[error("Token addresses and price feed addresses must be same length: {tokens} tokens, {feeds} feeds")]
    TokenAddressesAndPriceFeedAddressesMustBeSameLength {
        /// Number of collateral tokens supplied
        tokens: usize,
        /// Number of price feeds supplied
        feeds: usize,
    },

    /// Engine or collaborator misconfiguration
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ═══════════════════════════════════════════════════════════════════
    // Oracle Errors
    // ═══════════════════════════════════════════════════════════════════

    /// The price feed for a token cannot be used
    #[error("Price unavailable for {token}: {reason}")]
    PriceUnavailable {
        /// Collateral token being priced
        token: Address,
        /// What was wrong with the round
        reason: PriceFault,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Solvency Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Operation would leave the account below the minimum health factor
    #[error("Breaks health factor: {0}")]
    BreaksHealthFactor(u128),

    /// Target of a liquidation is solvent
    #[error("Health factor ok, account cannot be liquidated")]
    HealthFactorOk,

    /// Liquidation did not strictly raise the account's health factor
    #[error("Health factor not improved by liquidation")]
    HealthFactorNotImproved,

    // ═══════════════════════════════════════════════════════════════════
    // Balance Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Withdraw, burn or transfer exceeds the tracked balance
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount requested
        required: u128,
        /// Amount available
        available: u128,
    },

    /// Spender allowance too small for transfer_from
    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance {
        /// Amount requested
        required: u128,
        /// Allowance available
        available: u128,
    },

    // ═══════════════════════════════════════════════════════════════════
    // External Call Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Token reported a failed transfer
    #[error("Transfer failed for token {token}")]
    TransferFailed {
        /// Token whose transfer failed
        token: Address,
    },

    /// Stable token reported a failed mint
    #[error("Mint failed")]
    MintFailed,

    /// Caller lacks the capability for this call
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Mutating call entered while another one is in flight
    #[error("Reentrant call rejected")]
    Reentrancy,

    // ═══════════════════════════════════════════════════════════════════
    // Arithmetic Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Division by zero
    #[error("Division by zero in {operation}")]
    DivisionByZero {
        /// Operation that divided by zero
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invariant violation detected
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Lock acquisition failed
    #[error("Failed to acquire lock")]
    Lock,
}

impl Error {
    /// Returns true if the caller can fix the input and try again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidAmount
                | Error::BreaksHealthFactor(_)
                | Error::HealthFactorOk
                | Error::HealthFactorNotImproved
                | Error::InsufficientAllowance { .. }
                | Error::Reentrancy
                | Error::PriceUnavailable {
                    reason: PriceFault::Stale { .. },
                    ..
                }
        )
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Error::InvariantViolation(_) | Error::Overflow { .. } | Error::Lock
        ) || self.is_configuration_error()
    }

    /// Returns true for construction-time and oracle misconfiguration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::TokenAddressesAndPriceFeedAddressesMustBeSameLength { .. }
                | Error::PriceUnavailable {
                    reason: PriceFault::NonPositive(_) | PriceFault::NeverUpdated,
                    ..
                }
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Input errors: 1xxx
            Error::InvalidAmount => 1001,
            Error::UnsupportedToken(_) => 1002,
            Error::ZeroAddress => 1003,

            // Configuration errors: 2xxx
            Error::TokenAddressesAndPriceFeedAddressesMustBeSameLength { .. } => 2001,
            Error::Configuration(_) => 2002,

            // Oracle errors: 3xxx
            Error::PriceUnavailable { .. } => 3001,

            // Solvency errors: 4xxx
            Error::BreaksHealthFactor(_) => 4001,
            Error::HealthFactorOk => 4002,
            Error::HealthFactorNotImproved => 4003,

            // Balance errors: 5xxx
            Error::InsufficientBalance { .. } => 5001,
            Error::InsufficientAllowance { .. } => 5002,

            // External call errors: 6xxx
            Error::TransferFailed { .. } => 6001,
            Error::MintFailed => 6002,
            Error::Unauthorized(_) => 6003,
            Error::Reentrancy => 6004,

            // Arithmetic errors: 7xxx
            Error::Overflow { .. } => 7001,
            Error::DivisionByZero { .. } => 7002,

            // Internal errors: 9xxx
            Error::InvariantViolation(_) => 9001,
            Error::Lock => 9002,
        }
    }
}
