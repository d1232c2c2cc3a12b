//! SQLite persistence adapters.
//!
//! Provides a SQLite-backed implementation of the match, bet and account
//! stores using Diesel ORM. Money is stored in integer minor units so that
//! balance movements are exact single-statement increments.

pub mod database;
mod account;
mod bet;
mod fixture;
mod store;

pub use store::SqliteStore;
