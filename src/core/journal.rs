//! Journal of external token interactions inside one engine operation.
//!
//! Every operation stages its ledger changes and talks to token contracts in
//! a fixed shape:
//!
//! 1. Zero or more compensable steps: pulling tokens into the engine and
//!    burning stable tokens the engine holds. Each records how to undo it.
//! 2. At most one final step: sending collateral out or minting stable
//!    tokens to a user. Those cannot be undone, so they run last, after
//!    every check has passed.
//!
//! If anything fails before the final step completes, recorded steps are
//! undone in reverse order and the staged ledger changes are discarded.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::token::erc20::FungibleToken;
use crate::token::stable::StableToken;
use crate::utils::address::Address;
use crate::utils::math::Amount;

type Undo = Box<dyn FnOnce() -> Result<bool>>;

struct Compensation {
    label: String,
    undo: Undo,
}

/// Irreversible step that settles an operation
pub enum FinalStep {
    /// Transfer collateral held by the engine to `to`
    Send {
        /// Collateral token
        token: Arc<dyn FungibleToken>,
        /// Recipient
        to: Address,
        /// Amount to send
        amount: Amount,
    },
    /// Mint new stable tokens to `to`
    Mint {
        /// Recipient
        to: Address,
        /// Amount to mint
        amount: Amount,
    },
}

impl std::fmt::Debug for FinalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinalStep::Send { token, to, amount } => f
                .debug_struct("Send")
                .field("token", &token.address())
                .field("to", to)
                .field("amount", amount)
                .finish(),
            FinalStep::Mint { to, amount } => f
                .debug_struct("Mint")
                .field("to", to)
                .field("amount", amount)
                .finish(),
        }
    }
}

/// Recorded interactions of one in-flight operation
pub struct Journal {
    engine: Address,
    dsc: Arc<dyn StableToken>,
    compensations: Vec<Compensation>,
}

impl Journal {
    /// Start an empty journal for calls made by `engine`
    pub fn new(engine: Address, dsc: Arc<dyn StableToken>) -> Self {
        Self {
            engine,
            dsc,
            compensations: Vec::new(),
        }
    }

    /// Number of compensable steps recorded so far
    pub fn len(&self) -> usize {
        self.compensations.len()
    }

    /// True before any compensable step ran
    pub fn is_empty(&self) -> bool {
        self.compensations.is_empty()
    }

    /// Pull `amount` of `token` from `from` into the engine via allowance
    pub fn pull<T>(&mut self, token: &Arc<T>, from: Address, amount: Amount) -> Result<()>
    where
        T: FungibleToken + ?Sized + 'static,
    {
        let engine = self.engine;
        let address = token.address();
        if !token.transfer_from(engine, from, engine, amount)? {
            return Err(Error::TransferFailed { token: address });
        }

        let handle = Arc::clone(token);
        self.record(
            format!("refund {} of {} to {}", amount, address.short(), from.short()),
            Box::new(move || handle.transfer(engine, from, amount)),
        );
        Ok(())
    }

    /// Burn `amount` of stable tokens held by the engine
    pub fn burn(&mut self, amount: Amount) -> Result<()> {
        self.dsc.burn(self.engine, amount)?;

        let engine = self.engine;
        let dsc = Arc::clone(&self.dsc);
        self.record(
            format!("re-mint {} burned stable tokens", amount),
            Box::new(move || dsc.mint(engine, engine, amount)),
        );
        Ok(())
    }

    /// Run the final step, unwinding everything recorded if it fails
    pub fn settle(self, step: Option<FinalStep>) -> Result<()> {
        let Some(step) = step else {
            return Ok(());
        };

        let outcome = match &step {
            FinalStep::Send { token, to, amount } => match token.transfer(self.engine, *to, *amount) {
                Ok(true) => Ok(()),
                Ok(false) => Err(Error::TransferFailed {
                    token: token.address(),
                }),
                Err(e) => Err(e),
            },
            FinalStep::Mint { to, amount } => match self.dsc.mint(self.engine, *to, *amount) {
                Ok(true) => Ok(()),
                Ok(false) => Err(Error::MintFailed),
                Err(e) => Err(e),
            },
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(step = ?step, error = %e, "Final interaction failed");
                Err(self.unwind(e))
            }
        }
    }

    /// Undo every recorded step in reverse order.
    ///
    /// Returns `cause` when all compensations succeed. A failed compensation
    /// means tokens and ledgers may disagree and is reported as an
    /// [`Error::InvariantViolation`].
    pub fn unwind(self, cause: Error) -> Error {
        let mut failures = Vec::new();

        for compensation in self.compensations.into_iter().rev() {
            let Compensation { label, undo } = compensation;
            match undo() {
                Ok(true) => tracing::debug!(step = %label, "Compensated"),
                Ok(false) => failures.push(format!("{}: token declined", label)),
                Err(e) => failures.push(format!("{}: {}", label, e)),
            }
        }

        if failures.is_empty() {
            return cause;
        }

        tracing::error!(cause = %cause, failures = ?failures, "Compensation failed");
        Error::InvariantViolation(format!(
            "{}; compensation failed: {}",
            cause,
            failures.join(", ")
        ))
    }

    fn record(&mut self, label: String, undo: Undo) {
        self.compensations.push(Compensation { label, undo });
    }
}
