//! Handlers for `parlay user` commands.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::UserCommand;
use super::context::Services;
use super::output;
use crate::domain::id::UserId;
use crate::domain::ledger::LedgerEntry;
use crate::domain::money::Amount;
use crate::error::Result;
use crate::port::outbound::store::{AccountStore, BetStore, MatchStore};

#[derive(Tabled)]
struct LedgerRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&LedgerEntry> for LedgerRow {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            when: entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            kind: entry.kind.to_string(),
            amount: entry.amount.to_string(),
            reference: entry.reference.clone().unwrap_or_default(),
            description: entry.description.clone(),
        }
    }
}

/// Execute a user command.
///
/// # Errors
/// Returns any error from the wallet service.
pub async fn execute<S>(command: UserCommand, services: &Services<S>) -> Result<()>
where
    S: MatchStore + BetStore + AccountStore,
{
    let wallet = &services.wallet;
    match command {
        UserCommand::Create(args) => {
            let account = wallet.open_account(&args.nickname).await?;
            if output::is_json() {
                output::json_output(json!({ "command": "user.create", "account": account }));
                return Ok(());
            }
            output::success(&format!("Account opened for {}", account.nickname));
            output::field("User ID", output::highlight(&account.id));
        }
        UserCommand::Balance(args) => {
            let account = wallet.account(&UserId::from(args.user_id)).await?;
            if output::is_json() {
                output::json_output(json!({ "command": "user.balance", "account": account }));
                return Ok(());
            }
            output::field("User", &account.nickname);
            output::field("Balance", &account.balance);
        }
        UserCommand::Deposit(args) => {
            let user = UserId::from(args.user_id);
            let balance = wallet.deposit(&user, args.amount, args.reference).await?;
            report_movement("user.deposit", "Deposited", &user, args.amount, balance);
        }
        UserCommand::Withdraw(args) => {
            let user = UserId::from(args.user_id);
            let balance = wallet.withdraw(&user, args.amount, args.reference).await?;
            report_movement("user.withdraw", "Withdrew", &user, args.amount, balance);
        }
        UserCommand::Enter(args) => {
            let user = UserId::from(args.user_id);
            let balance = wallet
                .charge_tournament_entry(&user, args.amount, &args.tournament)
                .await?;
            report_movement("user.enter", "Entry fee charged", &user, args.amount, balance);
        }
        UserCommand::Prize(args) => {
            let user = UserId::from(args.user_id);
            let balance = wallet
                .award_tournament_prize(&user, args.amount, &args.tournament)
                .await?;
            report_movement("user.prize", "Prize credited", &user, args.amount, balance);
        }
        UserCommand::History(args) => {
            let user = UserId::from(args.user_id);
            let entries = wallet.history(&user).await?;
            if output::is_json() {
                output::json_output(json!({ "command": "user.history", "entries": entries }));
                return Ok(());
            }
            if entries.is_empty() {
                output::note("No ledger entries yet.");
                return Ok(());
            }
            output::section("Ledger");
            let rows: Vec<LedgerRow> = entries.iter().map(LedgerRow::from).collect();
            output::lines(&Table::new(rows).to_string());
        }
    }
    Ok(())
}

fn report_movement(command: &str, verb: &str, user: &UserId, amount: Amount, balance: Amount) {
    if output::is_json() {
        output::json_output(json!({
            "command": command,
            "user_id": user,
            "amount": amount,
            "balance": balance,
        }));
        return;
    }
    output::success(&format!("{verb} {amount}"));
    output::field("Balance", balance);
}
