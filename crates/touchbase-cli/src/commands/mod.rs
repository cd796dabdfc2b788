pub mod config;
pub mod contact;
pub mod list;
pub mod meeting;
pub mod remind;

use chrono::{Local, NaiveDate};
use touchbase_core::{Config, ContactBook, ContactDb, ReminderOutbox, ReminderSync};
use tracing::debug;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open storage, config and reminders for one command.
///
/// Opening rebuilds the reminder outbox from the stored contacts, so a
/// reminder write lost after a contact change is repaired on the next run.
pub struct Session {
    pub db: ContactDb,
    pub outbox: ReminderOutbox,
    pub config: Config,
    pub book: ContactBook,
}

impl Session {
    pub fn open() -> CliResult<Self> {
        let config = Config::load()?;
        let db = ContactDb::open()?;
        let mut outbox = ReminderOutbox::open()?;
        let book = db.load_book()?;
        outbox.reconcile(book.contacts(), config.reminder_time()?)?;
        Ok(Self {
            db,
            outbox,
            config,
            book,
        })
    }

    /// Persist pending book changes and bring reminders up to date.
    pub fn commit(&mut self) -> CliResult {
        let events = self.book.drain_events();
        self.db.apply_events(&events)?;
        let sync = ReminderSync::new(self.config.reminder_time()?);
        let scheduled = sync.apply(&events, &mut self.outbox)?;
        debug!(events = events.len(), scheduled, "session committed");
        Ok(())
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        self.config.display.format_date(date)
    }
}

/// Today in the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse `YYYY-MM-DD`, or the words `today` / `yesterday`.
pub fn parse_date(value: &str) -> CliResult<NaiveDate> {
    match value.trim() {
        "today" => Ok(today()),
        "yesterday" => today()
            .pred_opt()
            .ok_or_else(|| "date out of range".into()),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{other}' (expected YYYY-MM-DD): {e}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_and_words() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(parse_date("today").unwrap(), today());
        assert!(parse_date("29.02.2024").is_err());
        assert!(parse_date("2023-02-29").is_err());
    }
}
