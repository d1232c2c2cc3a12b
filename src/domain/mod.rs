//! Betting domain: pure types and pure functions, no I/O.
//!
//! - [`odds`] - combined odds and potential win
//! - [`market`] - per-market selection rules
//! - [`settlement`] - the bet state machine
//! - [`fixture`], [`bet`], [`ledger`] - entities

pub mod bet;
pub mod error;
pub mod fixture;
pub mod id;
pub mod ledger;
pub mod market;
pub mod money;
pub mod odds;
pub mod settlement;

pub use bet::{Bet, BetStatus, NewSelection, Selection, SelectionResult};
pub use error::DomainError;
pub use fixture::{Match, MatchChange, MatchStatus, Score};
pub use id::{BetId, MatchId, UserId};
pub use ledger::{Account, LedgerEntry, LedgerKind};
pub use money::{Amount, Odd};
pub use settlement::{evaluate, Evaluation, MatchBoard, MatchSnapshot, Transition};
