//! SQLite-based storage for contacts and meetings.
//!
//! Provides persistent storage for:
//! - Contacts with their cadence and reminder switch
//! - Meetings logged against a contact

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{data_dir, migrations, DB_FILE};
use crate::cadence::{Cadence, CadenceUnit};
use crate::contact::{Contact, ContactBook, Meeting, Mood};
use crate::error::{DatabaseError, Result};
use crate::events::Event;

const DATE_FMT: &str = "%Y-%m-%d";

const CONTACT_COLUMNS: &str = "id, name, birthday, is_favorite, cadence_unit, cadence_count,
     initial_contact, last_contact, reminder, created_at";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn parse_date(table: &'static str, value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FMT).map_err(|e| DatabaseError::CorruptRow {
        table,
        message: format!("bad date '{value}': {e}"),
    })
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(value = dt_str, "unparsable created_at, using now");
            Utc::now()
        })
}

/// Raw contact row before field validation.
struct ContactRow {
    id: String,
    name: String,
    birthday: Option<String>,
    is_favorite: bool,
    cadence_unit: String,
    cadence_count: u32,
    initial_contact: String,
    last_contact: String,
    reminder: bool,
    created_at: String,
}

impl ContactRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            birthday: row.get(2)?,
            is_favorite: row.get::<_, i32>(3)? != 0,
            cadence_unit: row.get(4)?,
            cadence_count: row.get(5)?,
            initial_contact: row.get(6)?,
            last_contact: row.get(7)?,
            reminder: row.get::<_, i32>(8)? != 0,
            created_at: row.get(9)?,
        })
    }

    fn into_contact(self) -> Result<Contact, DatabaseError> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "contacts",
            message,
        };
        let unit: CadenceUnit = self
            .cadence_unit
            .parse()
            .map_err(|e: crate::error::ValidationError| corrupt(e.to_string()))?;
        let cadence = Cadence::new(unit, self.cadence_count).map_err(|e| corrupt(e.to_string()))?;
        Ok(Contact {
            birthday: self
                .birthday
                .as_deref()
                .map(|b| parse_date("contacts", b))
                .transpose()?,
            initial_contact: parse_date("contacts", &self.initial_contact)?,
            last_contact: parse_date("contacts", &self.last_contact)?,
            created_at: parse_datetime_fallback(&self.created_at),
            id: self.id,
            name: self.name,
            is_favorite: self.is_favorite,
            cadence,
            reminder: self.reminder,
        })
    }
}

struct MeetingRow {
    id: String,
    contact_id: String,
    date: String,
    mood: u8,
    notes: String,
}

impl MeetingRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            date: row.get(2)?,
            mood: row.get(3)?,
            notes: row.get(4)?,
        })
    }

    fn into_meeting(self) -> Result<Meeting, DatabaseError> {
        Ok(Meeting {
            date: parse_date("meetings", &self.date)?,
            mood: Mood::from_rating(self.mood).map_err(|e| DatabaseError::CorruptRow {
                table: "meetings",
                message: e.to_string(),
            })?,
            id: self.id,
            contact_id: self.contact_id,
            notes: self.notes,
        })
    }
}

/// SQLite database for contacts and meetings.
pub struct ContactDb {
    conn: Connection,
}

impl ContactDb {
    /// Open the database at `~/.config/touchbase/touchbase.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join(DB_FILE))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS contacts (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                birthday        TEXT,
                is_favorite     INTEGER NOT NULL DEFAULT 0,
                cadence_unit    TEXT NOT NULL,
                cadence_count   INTEGER NOT NULL,
                initial_contact TEXT NOT NULL,
                last_contact    TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meetings (
                id         TEXT PRIMARY KEY,
                contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
                date       TEXT NOT NULL,
                mood       INTEGER NOT NULL,
                notes      TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_meetings_contact_date ON meetings(contact_id, date);",
        )?;

        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // === Contact CRUD ===

    /// Insert or replace a contact.
    pub fn upsert_contact(&self, contact: &Contact) -> Result<()> {
        self.conn.execute(
            "INSERT INTO contacts (id, name, birthday, is_favorite, cadence_unit, cadence_count,
                                   initial_contact, last_contact, reminder, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                birthday = excluded.birthday,
                is_favorite = excluded.is_favorite,
                cadence_unit = excluded.cadence_unit,
                cadence_count = excluded.cadence_count,
                initial_contact = excluded.initial_contact,
                last_contact = excluded.last_contact,
                reminder = excluded.reminder",
            params![
                contact.id,
                contact.name,
                contact.birthday.map(format_date),
                if contact.is_favorite { 1 } else { 0 },
                contact.cadence.unit.as_str(),
                contact.cadence.interval_count,
                format_date(contact.initial_contact),
                format_date(contact.last_contact),
                if contact.reminder { 1 } else { 0 },
                contact.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_contact(&self, id: &str) -> Result<Option<Contact>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                ContactRow::from_row,
            )
            .optional()?;
        Ok(row.map(ContactRow::into_contact).transpose()?)
    }

    /// List all contacts in insertion order.
    pub fn list_contacts(&self) -> Result<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY rowid"))?;
        let rows = stmt
            .query_map([], ContactRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let contacts = rows
            .into_iter()
            .map(ContactRow::into_contact)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    /// Delete a contact; its meetings go with it.
    pub fn delete_contact(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM meetings WHERE contact_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        Ok(())
    }

    // === Meeting CRUD ===

    pub fn upsert_meeting(&self, meeting: &Meeting) -> Result<()> {
        self.conn.execute(
            "INSERT INTO meetings (id, contact_id, date, mood, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                date = excluded.date,
                mood = excluded.mood,
                notes = excluded.notes",
            params![
                meeting.id,
                meeting.contact_id,
                format_date(meeting.date),
                meeting.mood.rating(),
                meeting.notes,
            ],
        )?;
        Ok(())
    }

    /// Meetings of one contact, newest first.
    pub fn list_meetings(&self, contact_id: &str) -> Result<Vec<Meeting>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, date, mood, notes FROM meetings
             WHERE contact_id = ?1 ORDER BY date DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map(params![contact_id], MeetingRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .map(MeetingRow::into_meeting)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_all_meetings(&self) -> Result<Vec<Meeting>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, contact_id, date, mood, notes FROM meetings ORDER BY rowid")?;
        let rows = stmt
            .query_map([], MeetingRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .map(MeetingRow::into_meeting)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_meeting(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM meetings WHERE id = ?1", params![id])?;
        Ok(())
    }

    // === Book persistence ===

    /// Load every contact and meeting into a [`ContactBook`].
    pub fn load_book(&self) -> Result<ContactBook> {
        let contacts = self.list_contacts()?;
        let meetings = self.list_all_meetings()?;
        debug!(contacts = contacts.len(), meetings = meetings.len(), "book loaded");
        Ok(ContactBook::from_records(contacts, meetings))
    }

    /// Write the changes described by `events` in a single transaction.
    pub fn apply_events(&self, events: &[Event]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<()> = (|| {
            for event in events {
                match event {
                    Event::ContactSaved { contact, .. } => self.upsert_contact(contact)?,
                    Event::ContactDeleted { id, .. } => self.delete_contact(id)?,
                    Event::MeetingSaved { meeting, .. } => self.upsert_meeting(meeting)?,
                    Event::MeetingDeleted { id, .. } => self.delete_meeting(id)?,
                }
            }
            Ok(())
        })();
        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                debug!(events = events.len(), "events persisted");
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }
}
