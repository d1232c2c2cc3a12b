//! Parlay - settlement engine for multi-selection football bets.
//!
//! A parlay combines several selections into one ticket that pays only if
//! every selection wins. This crate prices tickets, resolves selections
//! against final scores, and settles bets exactly once, crediting winners
//! through an append-only ledger.
//!
//! # Architecture
//!
//! - **`domain`** - pure types and functions: odds, markets, the bet state
//!   machine, ledger entries
//! - **`port`** - persistence contracts the services depend on
//! - **`adapter`** - SQLite and in-memory stores, and the CLI
//! - **`application`** - settlement, placement, match and wallet services
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Betting domain types and the settlement state machine
//! - [`error`] - Error types for the crate
//! - [`port`] - Store traits
//! - [`adapter`] - Store implementations and the CLI
//! - [`application`] - Use-case services
//!
//! # Example
//!
//! ```
//! use parlay::domain::odds::{combined_odd, potential_win};
//! use rust_decimal_macros::dec;
//!
//! let odd = combined_odd([Some(dec!(2.0)), Some(dec!(1.5)), Some(dec!(3.0))]);
//! assert_eq!(odd, dec!(9.00));
//! assert_eq!(potential_win(dec!(100), odd), dec!(900.00));
//! ```

pub mod adapter;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
