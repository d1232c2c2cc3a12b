//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use rust_decimal::Decimal;

use crate::config::BettingConfig;

/// Placement rules with a one-cent minimum and fail-closed markets.
pub fn betting() -> BettingConfig {
    BettingConfig::default()
}

/// Placement rules that reject unsupported markets up front.
pub fn strict_betting() -> BettingConfig {
    BettingConfig {
        strict_markets: true,
        ..BettingConfig::default()
    }
}

/// Placement rules with a custom minimum stake.
pub fn betting_with_min_stake(min_stake: Decimal) -> BettingConfig {
    BettingConfig {
        min_stake,
        ..BettingConfig::default()
    }
}
