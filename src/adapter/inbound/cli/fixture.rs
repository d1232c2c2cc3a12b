//! Handlers for `parlay match` commands.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::MatchCommand;
use super::context::Services;
use super::output;
use crate::application::{Deletion, SettlementSummary};
use crate::domain::fixture::Match;
use crate::domain::id::MatchId;
use crate::error::{Error, Result};
use crate::port::outbound::store::{AccountStore, BetStore, MatchStore};

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Match")]
    title: String,
    #[tabled(rename = "Kick-off")]
    kickoff: String,
    #[tabled(rename = "Score")]
    result: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Live")]
    live: &'static str,
}

impl From<&Match> for MatchRow {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id.to_string(),
            title: m.title(),
            kickoff: format!("{} {}", m.date, m.time).trim().to_string(),
            result: m.result(),
            status: m.status.to_string(),
            live: if m.is_live { "yes" } else { "" },
        }
    }
}

/// Execute a match command.
///
/// # Errors
/// Returns any error from the match or settlement services.
pub async fn execute<S>(command: MatchCommand, services: &Services<S>) -> Result<()>
where
    S: MatchStore + BetStore + AccountStore,
{
    let matches = &services.matches;
    match command {
        MatchCommand::Create(args) => {
            let odds = match args.odds.as_deref() {
                Some(raw) => serde_json::from_str(raw)
                    .map_err(|e| Error::InvalidInput(format!("--odds: {e}")))?,
                None => serde_json::Map::new(),
            };
            let m = matches
                .create(&args.home, &args.away, &args.date, &args.time, odds)
                .await?;
            show("match.create", &m, "Match created");
        }
        MatchCommand::List => {
            let all = matches.list().await?;
            if output::is_json() {
                output::json_output(json!({ "command": "match.list", "matches": all }));
                return Ok(());
            }
            if all.is_empty() {
                output::note("No matches yet.");
                return Ok(());
            }
            let rows: Vec<MatchRow> = all.iter().map(MatchRow::from).collect();
            output::lines(&Table::new(rows).to_string());
        }
        MatchCommand::Show(args) => {
            let m = matches.get(&MatchId::from(args.match_id)).await?;
            show("match.show", &m, &m.title());
        }
        MatchCommand::Goals(args) => {
            let m = matches
                .update_goals(&MatchId::from(args.match_id), args.home, args.away)
                .await?;
            show("match.goals", &m, &format!("Score is now {}", m.result()));
        }
        MatchCommand::Live(args) => {
            let m = matches.toggle_live(&MatchId::from(args.match_id)).await?;
            let message = if m.is_live { "Match is live" } else { "Match is no longer live" };
            show("match.live", &m, message);
        }
        MatchCommand::Close(args) => {
            let m = matches.toggle_closed(&MatchId::from(args.match_id)).await?;
            show("match.close", &m, &format!("Betting is {}", m.status));
        }
        MatchCommand::Finish(args) => {
            let id = MatchId::from(args.match_id);
            let summary = services.settlement.finish_match(&id).await?;
            report_summary("match.finish", &id, &summary);
        }
        MatchCommand::Settle(args) => {
            let id = MatchId::from(args.match_id);
            let summary = services.settlement.settle_match(&id).await?;
            report_summary("match.settle", &id, &summary);
        }
        MatchCommand::Delete(args) => {
            let id = MatchId::from(args.match_id);
            let deletion = matches.delete(&id).await?;
            if output::is_json() {
                output::json_output(json!({
                    "command": "match.delete",
                    "match_id": id,
                    "deletion": deletion,
                }));
                return Ok(());
            }
            match deletion {
                Deletion::Hard => output::success("Match deleted"),
                Deletion::Soft => {
                    output::success("Match marked deleted");
                    output::note("Bets reference this match; their selections stay pending.");
                }
            }
        }
    }
    Ok(())
}

fn show(command: &str, m: &Match, message: &str) {
    if output::is_json() {
        output::json_output(json!({ "command": command, "match": m }));
        return;
    }
    output::success(message);
    output::field("Match ID", output::highlight(&m.id));
    output::field("Match", m.title());
    output::field("Score", m.result());
    output::field("Status", m.status);
    if m.is_live {
        output::field("Live", "yes");
    }
}

fn report_summary(command: &str, id: &MatchId, summary: &SettlementSummary) {
    if output::is_json() {
        output::json_output(json!({
            "command": command,
            "match_id": id,
            "summary": summary,
        }));
        return;
    }

    output::success(&format!("Settled {} bet(s)", summary.evaluated));
    output::field("Won", output::positive(summary.won));
    output::field("Lost", output::negative(summary.lost));
    output::field("Pending", summary.pending);
    output::field("Paid out", &summary.paid_out);
    if summary.stale > 0 {
        output::field("Already settled", output::muted(summary.stale));
    }
    if summary.failed > 0 {
        output::warning(&format!(
            "{} bet(s) could not be settled; run `parlay match settle {id}` to retry",
            summary.failed
        ));
    }
    if summary.unsupported_selections > 0 {
        output::warning(&format!(
            "{} selection(s) on unsupported markets were settled as lost",
            summary.unsupported_selections
        ));
    }
}
