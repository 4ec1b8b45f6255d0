//! Token interfaces and in-memory implementations.
//!
//! This module contains the external token collaborators of the engine:
//! - Fungible collateral tokens
//! - The owner-gated stable-value token

pub mod erc20;
pub mod stable;

pub use erc20::*;
pub use stable::*;
