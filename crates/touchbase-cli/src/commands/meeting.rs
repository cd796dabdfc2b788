//! Meeting log commands for CLI.

use clap::Subcommand;
use touchbase_core::{MeetingDraft, Mood};

use super::contact::short_id;
use super::{parse_date, today, CliResult, Session};

#[derive(Subcommand)]
pub enum MeetingAction {
    /// Log a meeting with a contact
    Add {
        /// Contact ID (or unique prefix)
        contact: String,
        /// Meeting date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Mood rating 1-5 or emoji (default: 3)
        #[arg(long)]
        mood: Option<String>,
        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Edit a logged meeting
    Edit {
        /// Meeting ID (or unique prefix)
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        mood: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a logged meeting
    Delete {
        /// Meeting ID (or unique prefix)
        id: String,
    },
    /// List meetings for a contact, newest first
    List {
        /// Contact ID (or unique prefix)
        contact: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: MeetingAction) -> CliResult {
    let mut session = Session::open()?;

    match action {
        MeetingAction::Add {
            contact,
            date,
            mood,
            notes,
        } => {
            let contact_id = session.book.resolve_contact_id(&contact)?;
            let draft = MeetingDraft {
                date: date.as_deref().map(parse_date).transpose()?.unwrap_or_else(today),
                mood: mood.as_deref().map(str::parse::<Mood>).transpose()?.unwrap_or_default(),
                notes,
            };
            let meeting = session.book.add_meeting(&contact_id, draft)?;
            session.commit()?;
            println!("Meeting logged: {}", meeting.id);
            if let Some(contact) = session.book.contact(&contact_id) {
                println!(
                    "{} last contact: {}",
                    contact.name,
                    session.format_date(contact.last_contact)
                );
            }
        }
        MeetingAction::Edit {
            id,
            date,
            mood,
            notes,
        } => {
            let id = session.book.resolve_meeting_id(&id)?;
            let current = session
                .book
                .meeting(&id)
                .cloned()
                .ok_or_else(|| format!("meeting not found: {id}"))?;
            let draft = MeetingDraft {
                date: match date.as_deref() {
                    Some(value) => parse_date(value)?,
                    None => current.date,
                },
                mood: match mood.as_deref() {
                    Some(value) => value.parse()?,
                    None => current.mood,
                },
                notes: notes.unwrap_or(current.notes),
            };
            let meeting = session.book.edit_meeting(&id, draft)?;
            session.commit()?;
            println!("Meeting updated: {}", meeting.id);
        }
        MeetingAction::Delete { id } => {
            let id = session.book.resolve_meeting_id(&id)?;
            let meeting = session.book.delete_meeting(&id)?;
            session.commit()?;
            println!("Meeting deleted: {}", meeting.id);
        }
        MeetingAction::List { contact, json } => {
            let contact_id = session.book.resolve_contact_id(&contact)?;
            let meetings = session.book.meetings_for(&contact_id);
            if json {
                println!("{}", serde_json::to_string_pretty(&meetings)?);
                return Ok(());
            }
            if meetings.is_empty() {
                println!("No meetings logged.");
            }
            for m in &meetings {
                println!(
                    "{}  {}  {}  {}",
                    short_id(&m.id),
                    session.format_date(m.date),
                    m.mood,
                    m.notes
                );
            }
        }
    }
    Ok(())
}
