//! Bet placement rules.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Bet placement configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BettingConfig {
    /// Smallest stake accepted at placement.
    #[serde(default = "default_min_stake")]
    pub min_stake: Decimal,
    /// Reject selections on unsupported market/selection keys at placement.
    ///
    /// When false such selections are accepted and settle as lost.
    #[serde(default)]
    pub strict_markets: bool,
}

fn default_min_stake() -> Decimal {
    Decimal::new(1, 2)
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            min_stake: default_min_stake(),
            strict_markets: false,
        }
    }
}
