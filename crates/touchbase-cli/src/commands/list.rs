//! Contact list view for CLI.

use clap::Args;
use serde::Serialize;
use touchbase_core::{
    due_description, elapsed_description, empty_list_message, Contact, ListQuery, OrderMode,
};

use super::contact::short_id;
use super::{today, CliResult, Session};

#[derive(Args)]
pub struct ListArgs {
    /// Order: alphabetical, backwards, due_date or favorites (default from config)
    #[arg(long)]
    pub order: Option<String>,
    /// Only show contacts whose name contains this text
    #[arg(long)]
    pub search: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ListRow<'a> {
    #[serde(flatten)]
    contact: &'a Contact,
    next_due_date: Option<chrono::NaiveDate>,
    overdue: bool,
}

pub fn run(args: ListArgs) -> CliResult {
    let session = Session::open()?;
    let order = match args.order.as_deref() {
        Some(value) => value.parse::<OrderMode>()?,
        None => session.config.list.default_order,
    };
    let query = ListQuery {
        order,
        search: args.search,
    };
    let today = today();
    let contacts = session.book.visible(&query, today);

    if args.json {
        let rows: Vec<ListRow> = contacts
            .iter()
            .map(|c| ListRow {
                contact: c,
                next_due_date: c.next_due_date().ok(),
                overdue: c.is_overdue(today),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let locale = session.config.display.locale;
    if contacts.is_empty() {
        println!("{}", empty_list_message(&query, locale));
        return Ok(());
    }

    println!("{}", order.label());
    for c in &contacts {
        let star = if c.is_favorite { "★" } else { " " };
        let mark = if c.is_overdue(today) { "!" } else { " " };
        let elapsed = elapsed_description(c.last_contact, today, locale);
        let due = match c.next_due_date() {
            Ok(due) => due_description(due, today, locale).text,
            Err(_) => "-".to_string(),
        };
        println!(
            "{mark}{star} {:<24} {:<16} {:<20} [{}]",
            c.name,
            elapsed.text,
            due,
            short_id(&c.id)
        );
    }
    Ok(())
}
