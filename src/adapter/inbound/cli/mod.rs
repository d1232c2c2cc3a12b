//! CLI module graph.

pub mod bet;
pub mod command;
pub mod context;
pub mod diagnostic;
pub mod fixture;
pub mod output;
pub mod user;

pub use context::execute;
