use chrono::Local;
use clap::Subcommand;

use super::{CliResult, Session};

#[derive(Subcommand)]
pub enum RemindAction {
    /// List all scheduled reminders
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show reminders whose time has come
    Due {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: RemindAction) -> CliResult {
    let session = Session::open()?;

    let (reminders, json) = match action {
        RemindAction::List { json } => (session.outbox.pending()?, json),
        RemindAction::Due { json } => (session.outbox.due(Local::now().naive_local())?, json),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&reminders)?);
        return Ok(());
    }
    if reminders.is_empty() {
        println!("No reminders.");
    }
    for r in &reminders {
        println!("{}  {}", r.trigger.format("%Y-%m-%d %H:%M"), r.title);
    }
    Ok(())
}
