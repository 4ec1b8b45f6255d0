//! Core modules for the DSC engine.
//!
//! This module contains the accounting and solvency machinery:
//! - Collateral registry and ledger
//! - Debt ledger
//! - Health factor calculation
//! - The engine orchestrating every operation
//! - Engine configuration and events

pub mod collateral;
pub mod config;
pub mod debt;
pub mod engine;
pub mod events;
pub mod guard;
pub mod journal;
pub mod solvency;

pub use collateral::*;
pub use config::*;
pub use debt::*;
pub use engine::*;
pub use events::*;
pub use guard::*;
pub use journal::*;
pub use solvency::*;
