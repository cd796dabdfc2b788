//! # Touchbase Core Library
//!
//! This library provides the core logic for Touchbase, a personal CRM that
//! tracks how often you want to be in touch with people and tells you when
//! the next contact is due. All operations are available through the
//! standalone CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Cadence**: pure due-date arithmetic over calendar dates
//! - **ContactBook**: an owned state container that keeps each contact's
//!   last-contact date equal to its latest meeting and emits an [`Event`] per
//!   change
//! - **View**: ordering, filtering and search over the contact list
//! - **Reminders**: plans the reminder for each contact and drives a
//!   [`Notifier`]
//! - **Storage**: SQLite storage for contacts, meetings and the reminder
//!   outbox, plus TOML configuration
//!
//! ## Key Components
//!
//! - [`next_due_date`]: the cadence engine
//! - [`ContactBook`]: contacts and meetings in memory
//! - [`ContactDb`]: contact persistence
//! - [`Config`]: application configuration management

pub mod cadence;
pub mod contact;
pub mod error;
pub mod events;
pub mod phrase;
pub mod reminder;
pub mod storage;
pub mod view;

pub use cadence::{is_overdue, next_due_date, Cadence, CadenceUnit};
pub use contact::{Contact, ContactBook, ContactEdit, Meeting, MeetingDraft, Mood, NewContact};
pub use error::{CadenceError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use phrase::{due_description, elapsed_description, Elapsed, Locale};
pub use reminder::{plan_reminder, Notifier, Reminder, ReminderSync, ReminderTime};
pub use storage::{Config, ContactDb, PendingReminder, ReminderOutbox};
pub use view::{empty_list_message, order, search, visible, ListQuery, OrderMode};
