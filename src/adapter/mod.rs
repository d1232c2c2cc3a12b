//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - driving side: the command-line interface
//! - [`outbound`] - driven side: memory and SQLite stores

pub mod inbound;
pub mod outbound;
