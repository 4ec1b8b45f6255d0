//! Oracle module for collateral pricing.
//!
//! This module provides:
//! - The price feed interface and a settable in-memory feed
//! - Clocks for staleness checks
//! - The adapter that normalizes feed answers to 18-decimal USD prices

pub mod adapter;
pub mod clock;
pub mod price_feed;

pub use adapter::*;
pub use clock::*;
pub use price_feed::*;
