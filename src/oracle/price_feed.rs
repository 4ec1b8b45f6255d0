//! Price feed interface and an in-memory feed.
//!
//! A feed answers the latest round: a signed price with its own decimal
//! precision and the time it was last updated. The engine never trusts the
//! answer blindly; see [`crate::oracle::adapter`] for normalization and
//! validation.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::utils::address::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// ROUND DATA
// ═══════════════════════════════════════════════════════════════════════════════

/// The latest answer published by a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    /// Monotonic round identifier
    pub round_id: u64,
    /// Price in feed units (e.g. `2000_00000000` for $2000 at 8 decimals)
    pub answer: i128,
    /// Unix timestamp when the round started
    pub started_at: u64,
    /// Unix timestamp of the last update; zero means never updated
    pub updated_at: u64,
    /// Round in which the answer was computed
    pub answered_in_round: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE FEED TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// External USD price source for one collateral token
pub trait PriceFeed: Send + Sync {
    /// Identity of the feed
    fn address(&self) -> Address;

    /// Decimal precision of `answer`
    fn decimals(&self) -> u8;

    /// Latest round published by the feed
    fn latest_round_data(&self) -> Result<RoundData>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// MOCK PRICE FEED
// ═══════════════════════════════════════════════════════════════════════════════

/// Settable in-memory feed used by tests and the simulator
#[derive(Debug)]
pub struct MockPriceFeed {
    address: Address,
    decimals: u8,
    round: RwLock<RoundData>,
}

impl MockPriceFeed {
    /// Create a feed that answers `initial_answer` as of `updated_at`
    pub fn new(address: Address, decimals: u8, initial_answer: i128, updated_at: u64) -> Self {
        Self {
            address,
            decimals,
            round: RwLock::new(RoundData {
                round_id: 1,
                answer: initial_answer,
                started_at: updated_at,
                updated_at,
                answered_in_round: 1,
            }),
        }
    }

    /// Create a feed stamped with the current wall-clock time
    pub fn new_now(address: Address, decimals: u8, initial_answer: i128) -> Self {
        Self::new(address, decimals, initial_answer, now_secs())
    }

    /// Publish a new answer stamped with the current wall-clock time
    pub fn update_answer(&self, answer: i128) -> Result<()> {
        self.update_answer_at(answer, now_secs())
    }

    /// Publish a new answer with an explicit timestamp
    pub fn update_answer_at(&self, answer: i128, updated_at: u64) -> Result<()> {
        let mut round = self.round.write().map_err(|_| Error::Lock)?;
        let next = round.round_id + 1;
        *round = RoundData {
            round_id: next,
            answer,
            started_at: updated_at,
            updated_at,
            answered_in_round: next,
        };
        Ok(())
    }
}

impl PriceFeed for MockPriceFeed {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn latest_round_data(&self) -> Result<RoundData> {
        let round = self.round.read().map_err(|_| Error::Lock)?;
        Ok(*round)
    }
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
