//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (databases today; anything with atomic conditional writes).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!     CLI ──────────▶│      Application        │
//!                    │  (settlement, betting,  │
//!                    │   matches, wallet)      │
//!                    └────────────┬────────────┘
//!                                 │ Domain + Port
//!                     ┌───────────┴───────────┐
//!                     ▼                       ▼
//!               ┌───────────┐          ┌─────────────┐
//!               │  Memory   │          │   SQLite    │
//!               │   Store   │          │   Store     │
//!               └───────────┘          └─────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`outbound::store::MatchStore`] - Match persistence
//! - [`outbound::store::BetStore`] - Bet persistence with the payout guard
//! - [`outbound::store::AccountStore`] - Balances and ledger entries

pub mod outbound;
