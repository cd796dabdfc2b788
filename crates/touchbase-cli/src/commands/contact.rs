//! Contact management commands for CLI.

use clap::Subcommand;
use serde::Serialize;
use touchbase_core::{
    due_description, elapsed_description, Cadence, CadenceUnit, Contact, ContactEdit, Meeting,
    MeetingDraft, Mood, NewContact,
};

use super::{parse_date, today, CliResult, Session};

#[derive(Subcommand)]
pub enum ContactAction {
    /// Add a new contact
    Add {
        /// Contact name
        name: String,
        /// Cadence interval count (default: 1)
        #[arg(long, default_value_t = 1)]
        every: u32,
        /// Cadence unit: day, week, month or year (default: week)
        #[arg(long, default_value = "week")]
        unit: String,
        /// Date of the last contact as YYYY-MM-DD (default: today)
        #[arg(long)]
        last: Option<String>,
        /// Birthday as YYYY-MM-DD
        #[arg(long)]
        birthday: Option<String>,
        /// Mark as favorite
        #[arg(long)]
        favorite: bool,
        /// Do not schedule reminders for this contact
        #[arg(long)]
        no_reminder: bool,
        /// Log the last contact as a meeting with this mood (1-5)
        #[arg(long)]
        mood: Option<String>,
        /// Notes for the logged meeting
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a contact
    Edit {
        /// Contact ID (or unique prefix)
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New cadence interval count
        #[arg(long)]
        every: Option<u32>,
        /// New cadence unit
        #[arg(long)]
        unit: Option<String>,
        /// New birthday as YYYY-MM-DD, or "none" to clear it
        #[arg(long)]
        birthday: Option<String>,
        /// Turn reminders on or off
        #[arg(long)]
        reminder: Option<bool>,
        /// Fallback last contact date, used once every meeting is deleted
        #[arg(long)]
        last: Option<String>,
    },
    /// Show a contact with its meetings
    Show {
        /// Contact ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle favorite
    Favorite {
        /// Contact ID (or unique prefix)
        id: String,
    },
    /// Delete a contact and its meetings
    Delete {
        /// Contact ID (or unique prefix)
        id: String,
    },
}

#[derive(Serialize)]
struct ContactDetails<'a> {
    contact: &'a Contact,
    next_due_date: Option<chrono::NaiveDate>,
    overdue: bool,
    meetings: &'a [Meeting],
}

pub fn run(action: ContactAction) -> CliResult {
    let mut session = Session::open()?;

    match action {
        ContactAction::Add {
            name,
            every,
            unit,
            last,
            birthday,
            favorite,
            no_reminder,
            mood,
            notes,
        } => {
            let cadence = Cadence::new(unit.parse()?, every)?;
            let last_contact = last.as_deref().map(parse_date).transpose()?.unwrap_or_else(today);
            let mut new = NewContact::new(name, cadence, last_contact);
            new.birthday = birthday.as_deref().map(parse_date).transpose()?;
            new.is_favorite = favorite;
            new.reminder = session.config.reminders.enabled_by_default && !no_reminder;
            if mood.is_some() || notes.is_some() {
                let mood = mood.as_deref().map(str::parse::<Mood>).transpose()?;
                new.first_meeting = Some(MeetingDraft {
                    date: last_contact,
                    mood: mood.unwrap_or_default(),
                    notes: notes.unwrap_or_default(),
                });
            }

            let contact = session.book.create_contact(new)?;
            session.commit()?;
            println!("Contact created: {}", contact.id);
            println!("{}", serde_json::to_string_pretty(&contact)?);
        }
        ContactAction::Edit {
            id,
            name,
            every,
            unit,
            birthday,
            reminder,
            last,
        } => {
            let id = session.book.resolve_contact_id(&id)?;
            let current = session
                .book
                .contact(&id)
                .map(|c| c.cadence)
                .unwrap_or_default();
            let cadence = if every.is_some() || unit.is_some() {
                let unit: CadenceUnit = match unit {
                    Some(u) => u.parse()?,
                    None => current.unit,
                };
                Some(Cadence::new(unit, every.unwrap_or(current.interval_count))?)
            } else {
                None
            };
            let birthday = match birthday.as_deref() {
                None => None,
                Some("none") => Some(None),
                Some(value) => Some(Some(parse_date(value)?)),
            };
            let edit = ContactEdit {
                name,
                birthday,
                cadence,
                reminder,
                initial_contact: last.as_deref().map(parse_date).transpose()?,
            };

            let contact = session.book.edit_contact(&id, edit)?;
            session.commit()?;
            println!("Contact updated: {}", contact.id);
            println!("{}", serde_json::to_string_pretty(&contact)?);
        }
        ContactAction::Show { id, json } => {
            let id = session.book.resolve_contact_id(&id)?;
            let contact = session
                .book
                .contact(&id)
                .ok_or_else(|| format!("contact not found: {id}"))?;
            let meetings = session.book.meetings_for(&id);
            let next_due = contact.next_due_date().ok();
            let today = today();

            if json {
                let details = ContactDetails {
                    contact,
                    next_due_date: next_due,
                    overdue: contact.is_overdue(today),
                    meetings: &meetings,
                };
                println!("{}", serde_json::to_string_pretty(&details)?);
                return Ok(());
            }

            let locale = session.config.display.locale;
            let star = if contact.is_favorite { " ★" } else { "" };
            println!("{}{star}", contact.name);
            println!("  id:            {}", contact.id);
            println!("  cadence:       {}", contact.cadence);
            if let Some(birthday) = contact.birthday {
                println!("  birthday:      {}", session.format_date(birthday));
            }
            println!(
                "  last contact:  {} ({})",
                session.format_date(contact.last_contact),
                elapsed_description(contact.last_contact, today, locale).text
            );
            match next_due {
                Some(due) => println!(
                    "  next contact:  {} ({})",
                    session.format_date(due),
                    due_description(due, today, locale).text
                ),
                None => println!("  next contact:  never"),
            }
            println!("  reminder:      {}", if contact.reminder { "on" } else { "off" });
            if !meetings.is_empty() {
                println!("  meetings:");
                for m in &meetings {
                    let notes = if m.notes.is_empty() { "" } else { m.notes.as_str() };
                    println!(
                        "    {} {} {}  [{}]",
                        session.format_date(m.date),
                        m.mood,
                        notes,
                        short_id(&m.id)
                    );
                }
            }
        }
        ContactAction::Favorite { id } => {
            let id = session.book.resolve_contact_id(&id)?;
            let contact = session.book.toggle_favorite(&id)?;
            session.commit()?;
            if contact.is_favorite {
                println!("{} added to favorites", contact.name);
            } else {
                println!("{} removed from favorites", contact.name);
            }
        }
        ContactAction::Delete { id } => {
            let id = session.book.resolve_contact_id(&id)?;
            let contact = session.book.delete_contact(&id)?;
            session.commit()?;
            println!("Contact deleted: {} ({})", contact.name, contact.id);
        }
    }
    Ok(())
}

/// First block of a UUID, enough to address a record from the CLI.
pub fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}
