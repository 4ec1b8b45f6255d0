//! Engine events.
//!
//! Events are recorded only when an operation commits, in the order their
//! state changes were applied. The log is bounded; once full the oldest
//! entries are dropped.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::utils::address::Address;
use crate::utils::constants::DEFAULT_MAX_EVENTS;
use crate::utils::math::Amount;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// State change committed by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    /// Collateral credited to an account
    CollateralDeposited {
        /// Depositing account
        user: Address,
        /// Collateral token
        token: Address,
        /// Amount deposited
        amount: Amount,
    },
    /// Collateral debited from one account and sent to another
    CollateralRedeemed {
        /// Account whose collateral was debited
        from: Address,
        /// Recipient of the tokens
        to: Address,
        /// Collateral token
        token: Address,
        /// Amount redeemed
        amount: Amount,
    },
    /// Stable tokens minted against an account's collateral
    DscMinted {
        /// Indebted account
        user: Address,
        /// Amount minted
        amount: Amount,
    },
    /// Stable tokens burned to repay an account's debt
    DscBurned {
        /// Account whose debt decreased
        on_behalf_of: Address,
        /// Account that supplied the tokens
        from: Address,
        /// Amount burned
        amount: Amount,
    },
    /// An undercollateralized account was liquidated
    Liquidated {
        /// Liquidated account
        user: Address,
        /// Liquidator
        liquidator: Address,
        /// Collateral token seized
        token: Address,
        /// Debt repaid by the liquidator
        debt_covered: Amount,
        /// Collateral paid to the liquidator, bonus included
        collateral_seized: Amount,
    },
}

impl EngineEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CollateralDeposited { .. } => "CollateralDeposited",
            Self::CollateralRedeemed { .. } => "CollateralRedeemed",
            Self::DscMinted { .. } => "DscMinted",
            Self::DscBurned { .. } => "DscBurned",
            Self::Liquidated { .. } => "Liquidated",
        }
    }

    /// Account whose position the event changed
    pub fn account(&self) -> Address {
        match self {
            Self::CollateralDeposited { user, .. }
            | Self::DscMinted { user, .. }
            | Self::Liquidated { user, .. } => *user,
            Self::CollateralRedeemed { from, .. } => *from,
            Self::DscBurned { on_behalf_of, .. } => *on_behalf_of,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Bounded in-memory event log
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<EngineEvent>,
    max_events: usize,
    total_recorded: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS)
    }
}

impl EventLog {
    /// Create a log keeping at most `max_events` entries
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events: max_events.max(1),
            total_recorded: 0,
        }
    }

    /// Append events, dropping the oldest beyond capacity
    pub fn extend(&mut self, events: impl IntoIterator<Item = EngineEvent>) {
        for event in events {
            if self.events.len() == self.max_events {
                self.events.pop_front();
            }
            self.events.push_back(event);
            self.total_recorded += 1;
        }
    }

    /// Retained events, oldest first
    pub fn snapshot(&self) -> Vec<EngineEvent> {
        self.events.iter().cloned().collect()
    }

    /// Remove and return all retained events
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    /// Retained event count
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is retained
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded since creation, including dropped ones
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }
}
