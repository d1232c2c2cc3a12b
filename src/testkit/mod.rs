//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for matches, selections and bets.
//! - [`store`] - Seeding helpers that go through the store ports.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod domain;
pub mod store;
