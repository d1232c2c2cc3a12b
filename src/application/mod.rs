//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod betting;
pub mod fixture;
pub mod settlement;
pub mod wallet;

pub use betting::{BettingService, PlacedBet};
pub use fixture::{Deletion, MatchService};
pub use settlement::{SettledBet, SettlementService, SettlementSummary};
pub use wallet::WalletService;
