//! Command-line interface definitions.
//!
//! Defines the CLI structure for the parlay application using `clap`:
//! accounts, matches, bets and settlement over the configured store.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Parlay bet settlement engine
#[derive(Parser, Debug)]
#[command(name = "parlay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the parlay CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Manage accounts and balances
    #[command(subcommand)]
    User(UserCommand),

    /// Manage matches and trigger settlement
    #[command(subcommand)]
    Match(MatchCommand),

    /// Place, settle and list bets
    #[command(subcommand)]
    Bet(BetCommand),
}

/// Subcommands for `parlay user`.
#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Open a new account with a zero balance
    Create(UserCreateArgs),
    /// Show an account's balance
    Balance(UserArg),
    /// Credit an approved deposit
    Deposit(MovementArgs),
    /// Debit an approved withdrawal
    Withdraw(MovementArgs),
    /// Charge a tournament registration fee
    Enter(TournamentArgs),
    /// Credit a tournament prize
    Prize(TournamentArgs),
    /// Show ledger history, newest first
    History(UserArg),
}

/// Subcommands for `parlay match`.
#[derive(Subcommand, Debug)]
pub enum MatchCommand {
    /// Create an open match at 0-0
    Create(MatchCreateArgs),
    /// List matches, newest first
    List,
    /// Show one match
    Show(MatchArg),
    /// Set the live score
    Goals(GoalsArgs),
    /// Toggle the live flag
    Live(MatchArg),
    /// Toggle between open and closed for betting
    Close(MatchArg),
    /// Finish the match and settle its pending bets
    Finish(MatchArg),
    /// Re-run settlement for the match's pending bets
    Settle(MatchArg),
    /// Delete the match (soft if bets reference it)
    Delete(MatchArg),
}

/// Subcommands for `parlay bet`.
#[derive(Subcommand, Debug)]
pub enum BetCommand {
    /// Place a parlay
    Place(BetPlaceArgs),
    /// Re-run settlement for one bet
    Settle(BetArg),
    /// List bets, newest first
    List(BetListArgs),
}

/// A user id argument.
#[derive(Args, Debug)]
pub struct UserArg {
    /// Account id
    pub user_id: String,
}

/// Arguments for `parlay user create`.
#[derive(Args, Debug)]
pub struct UserCreateArgs {
    /// Display name
    pub nickname: String,
}

/// Arguments for deposits and withdrawals.
#[derive(Args, Debug)]
pub struct MovementArgs {
    /// Account id
    pub user_id: String,
    /// Amount (2 decimal places at most)
    pub amount: Decimal,
    /// External reference, e.g. a payment request id
    #[arg(long)]
    pub reference: Option<String>,
}

/// Arguments for tournament fees and prizes.
#[derive(Args, Debug)]
pub struct TournamentArgs {
    /// Account id
    pub user_id: String,
    /// Amount (2 decimal places at most)
    pub amount: Decimal,
    /// Tournament name
    #[arg(long)]
    pub tournament: String,
}

/// A match id argument.
#[derive(Args, Debug)]
pub struct MatchArg {
    /// Match id
    pub match_id: String,
}

/// Arguments for `parlay match create`.
#[derive(Args, Debug)]
pub struct MatchCreateArgs {
    /// Home team
    #[arg(long)]
    pub home: String,
    /// Away team
    #[arg(long)]
    pub away: String,
    /// Kick-off date
    #[arg(long, default_value = "")]
    pub date: String,
    /// Kick-off time
    #[arg(long, default_value = "")]
    pub time: String,
    /// Odds board as a JSON object keyed by market
    #[arg(long)]
    pub odds: Option<String>,
}

/// Arguments for `parlay match goals`.
#[derive(Args, Debug)]
pub struct GoalsArgs {
    /// Match id
    pub match_id: String,
    /// Home goals
    #[arg(allow_negative_numbers = true)]
    pub home: i64,
    /// Away goals
    #[arg(allow_negative_numbers = true)]
    pub away: i64,
}

/// A bet id argument.
#[derive(Args, Debug)]
pub struct BetArg {
    /// Bet id
    pub bet_id: String,
}

/// Arguments for `parlay bet place`.
#[derive(Args, Debug)]
pub struct BetPlaceArgs {
    /// Account id placing the bet
    #[arg(long)]
    pub user: String,
    /// Stake deducted at placement
    #[arg(long)]
    pub stake: Decimal,
    /// Selection as MATCH_ID:MARKET:SELECTION:ODD (repeatable)
    #[arg(long = "leg", required = true)]
    pub legs: Vec<String>,
}

/// Arguments for `parlay bet list`.
#[derive(Args, Debug)]
pub struct BetListArgs {
    /// Only bets placed by this account
    #[arg(long)]
    pub user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bet_place_collects_legs() {
        let cli = Cli::try_parse_from([
            "parlay", "bet", "place", "--user", "u1", "--stake", "10", "--leg", "m1:1X2:home:2.0",
            "--leg", "m2:OU:over_2.5:1.5",
        ])
        .unwrap();

        match cli.command {
            Commands::Bet(BetCommand::Place(args)) => {
                assert_eq!(args.legs.len(), 2);
                assert_eq!(args.stake, Decimal::from(10));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["parlay", "match", "list", "--json", "--config", "x.toml"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }
}
