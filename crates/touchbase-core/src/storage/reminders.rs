//! Persisted reminder outbox.
//!
//! Stands in for OS notification delivery: scheduled reminders are written to
//! the `reminders` table and read back by whatever surface shows them.

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{data_dir, DB_FILE};
use crate::contact::Contact;
use crate::error::{DatabaseError, Result};
use crate::reminder::{plan_reminder, Notifier, ReminderTime};

const TRIGGER_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// A reminder waiting in the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReminder {
    pub id: String,
    pub trigger: NaiveDateTime,
    pub title: String,
}

/// SQLite-backed [`Notifier`].
pub struct ReminderOutbox {
    conn: Connection,
}

impl ReminderOutbox {
    /// Open the outbox in the shared database file.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join(DB_FILE))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reminders (
                id      TEXT PRIMARY KEY,
                fire_at TEXT NOT NULL,
                title   TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reminders_fire_at ON reminders(fire_at);",
        )?;
        Ok(Self { conn })
    }

    /// All pending reminders, soonest first.
    pub fn pending(&self) -> Result<Vec<PendingReminder>> {
        self.query("SELECT id, fire_at, title FROM reminders ORDER BY fire_at, id", None)
    }

    /// Reminders whose trigger time is at or before `at`.
    pub fn due(&self, at: NaiveDateTime) -> Result<Vec<PendingReminder>> {
        self.query(
            "SELECT id, fire_at, title FROM reminders WHERE fire_at <= ?1 ORDER BY fire_at, id",
            Some(at),
        )
    }

    /// Replace every pending reminder with the ones planned for `contacts`.
    ///
    /// Runs in one transaction, so a reminder left stale by an interrupted
    /// sync is repaired and a config change of the reminder time takes effect.
    /// Returns the number of reminders now pending.
    pub fn reconcile(&mut self, contacts: &[Contact], at: ReminderTime) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM reminders", [])?;
        let mut scheduled = 0;
        {
            let mut insert =
                tx.prepare("INSERT INTO reminders (id, fire_at, title) VALUES (?1, ?2, ?3)")?;
            for reminder in contacts.iter().filter_map(|c| plan_reminder(c, at)) {
                insert.execute(params![
                    reminder.id,
                    reminder.trigger.format(TRIGGER_FMT).to_string(),
                    reminder.title
                ])?;
                scheduled += 1;
            }
        }
        tx.commit()?;
        if removed != scheduled {
            info!(removed, scheduled, "reminders reconciled");
        }
        Ok(scheduled)
    }

    fn query(&self, sql: &str, at: Option<NaiveDateTime>) -> Result<Vec<PendingReminder>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = match at {
            Some(at) => stmt
                .query_map(params![at.format(TRIGGER_FMT).to_string()], reminder_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], reminder_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        let reminders = rows
            .into_iter()
            .map(|(id, trigger, title)| -> Result<PendingReminder> {
                let trigger = NaiveDateTime::parse_from_str(&trigger, TRIGGER_FMT).map_err(|e| {
                    DatabaseError::CorruptRow {
                        table: "reminders",
                        message: format!("bad trigger '{trigger}': {e}"),
                    }
                })?;
                Ok(PendingReminder { id, trigger, title })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(reminders)
    }
}

fn reminder_row(row: &rusqlite::Row) -> rusqlite::Result<(String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

impl Notifier for ReminderOutbox {
    fn schedule(&mut self, id: &str, trigger: NaiveDateTime, title: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO reminders (id, fire_at, title) VALUES (?1, ?2, ?3)",
            params![id, trigger.format(TRIGGER_FMT).to_string(), title],
        )?;
        debug!(id, %trigger, "reminder queued");
        Ok(())
    }

    fn cancel(&mut self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM reminders WHERE id = ?1", params![id])?;
        Ok(())
    }
}
