//! Handlers for `parlay bet` commands.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::BetCommand;
use super::context::Services;
use super::output;
use crate::domain::bet::{Bet, BetStatus, NewSelection};
use crate::domain::id::{BetId, UserId};
use crate::error::{Error, Result};
use crate::port::outbound::store::{AccountStore, BetStore, MatchStore};

#[derive(Tabled)]
struct BetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Legs")]
    legs: usize,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Odd")]
    odd: String,
    #[tabled(rename = "To win")]
    potential_win: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Bet> for BetRow {
    fn from(bet: &Bet) -> Self {
        let status = match (bet.status(), bet.is_paid()) {
            (BetStatus::Won, true) => output::positive("won (paid)"),
            (BetStatus::Won, false) => output::positive("won"),
            (BetStatus::Lost, _) => output::negative("lost"),
            (BetStatus::Pending, _) => "pending".to_string(),
        };
        Self {
            id: bet.id().to_string(),
            user: bet.user_id().to_string(),
            legs: bet.selections().len(),
            stake: bet.stake().to_string(),
            odd: bet.combined_odd().to_string(),
            potential_win: bet.potential_win().to_string(),
            status,
        }
    }
}

#[derive(Tabled)]
struct LegRow {
    #[tabled(rename = "Match")]
    match_id: String,
    #[tabled(rename = "Selection")]
    label: String,
    #[tabled(rename = "Odd")]
    odd: String,
    #[tabled(rename = "Result")]
    result: String,
}

/// Parse `MATCH_ID:MARKET:SELECTION:ODD`.
///
/// # Errors
/// Returns [`Error::InvalidInput`] when the leg is malformed.
pub fn parse_leg(raw: &str) -> Result<NewSelection> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [match_id, market_key, selection_key, odd] = parts.as_slice() else {
        return Err(Error::InvalidInput(format!(
            "leg {raw:?} must look like MATCH_ID:MARKET:SELECTION:ODD"
        )));
    };
    let odd = Decimal::from_str(odd.trim())
        .map_err(|e| Error::InvalidInput(format!("leg {raw:?} has a bad odd: {e}")))?;

    Ok(NewSelection {
        match_id: match_id.trim().to_string(),
        market_key: market_key.trim().to_string(),
        selection_key: selection_key.trim().to_string(),
        odd: Some(odd),
        label: None,
    })
}

/// Execute a bet command.
///
/// # Errors
/// Returns any error from the betting or settlement services.
pub async fn execute<S>(command: BetCommand, services: &Services<S>) -> Result<()>
where
    S: MatchStore + BetStore + AccountStore,
{
    match command {
        BetCommand::Place(args) => {
            let legs = args
                .legs
                .iter()
                .map(|raw| parse_leg(raw))
                .collect::<Result<Vec<_>>>()?;
            let placed = services
                .betting
                .place_bet(&UserId::from(args.user), legs, args.stake)
                .await?;

            if output::is_json() {
                output::json_output(json!({ "command": "bet.place", "placed": placed }));
                return Ok(());
            }
            output::success("Bet placed");
            output::field("Bet ID", output::highlight(placed.bet.id()));
            output::field("Combined odd", placed.combined_odd);
            output::field("Potential win", placed.potential_win);
            output::field("Balance", placed.balance);
        }
        BetCommand::Settle(args) => {
            let settled = services
                .settlement
                .settle_bet(&BetId::from(args.bet_id))
                .await?;

            if output::is_json() {
                output::json_output(json!({
                    "command": "bet.settle",
                    "bet": settled.bet,
                    "transition": settled.transition,
                    "payout": settled.payout,
                }));
                return Ok(());
            }
            output::success(&format!("Bet is {}", settled.bet.status()));
            if let Some(payout) = settled.payout {
                output::field("Paid out", output::positive(payout));
            }
            show_legs(&settled.bet);
        }
        BetCommand::List(args) => {
            let bets = match args.user {
                Some(user) => services.betting.bets_for_user(&UserId::from(user)).await?,
                None => services.betting.all_bets().await?,
            };

            if output::is_json() {
                output::json_output(json!({ "command": "bet.list", "bets": bets }));
                return Ok(());
            }
            if bets.is_empty() {
                output::note("No bets yet.");
                return Ok(());
            }
            let rows: Vec<BetRow> = bets.iter().map(BetRow::from).collect();
            output::lines(&Table::new(rows).to_string());
        }
    }
    Ok(())
}

fn show_legs(bet: &Bet) {
    if output::verbosity() == 0 {
        return;
    }
    let rows: Vec<LegRow> = bet
        .selections()
        .iter()
        .map(|s| LegRow {
            match_id: s.match_id.to_string(),
            label: s.label.clone(),
            odd: s.odd.to_string(),
            result: s.result.to_string(),
        })
        .collect();
    output::section("Selections");
    output::lines(&Table::new(rows).to_string());
}
