//! Contacts, meetings and the moods recorded with them.

pub mod book;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cadence::{self, Cadence};
use crate::error::{CadenceError, ValidationError};

pub use book::ContactBook;

/// How a meeting went, on a 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    VeryBad,
    Bad,
    #[default]
    NotTooBad,
    Good,
    VeryGood,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::VeryBad,
        Mood::Bad,
        Mood::NotTooBad,
        Mood::Good,
        Mood::VeryGood,
    ];

    pub fn rating(self) -> u8 {
        match self {
            Mood::VeryBad => 1,
            Mood::Bad => 2,
            Mood::NotTooBad => 3,
            Mood::Good => 4,
            Mood::VeryGood => 5,
        }
    }

    pub fn from_rating(rating: u8) -> Result<Self, ValidationError> {
        match rating {
            1 => Ok(Mood::VeryBad),
            2 => Ok(Mood::Bad),
            3 => Ok(Mood::NotTooBad),
            4 => Ok(Mood::Good),
            5 => Ok(Mood::VeryGood),
            other => Err(ValidationError::OutOfRange {
                field: "mood",
                min: 1,
                max: 5,
                value: i64::from(other),
            }),
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::VeryBad => "😡",
            Mood::Bad => "🙁",
            Mood::NotTooBad => "🤔",
            Mood::Good => "🙂",
            Mood::VeryGood => "😀",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(rating) = s.parse::<u8>() {
            return Mood::from_rating(rating);
        }
        Mood::ALL
            .into_iter()
            .find(|m| m.emoji() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "mood".into(),
                message: format!("expected a rating 1-5, got '{s}'"),
            })
    }
}

/// A person the user wants to keep in touch with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub is_favorite: bool,
    pub cadence: Cadence,
    /// Last contact date given by the user; used once every meeting is deleted.
    pub initial_contact: NaiveDate,
    /// Latest meeting date, or `initial_contact` when there are no meetings.
    pub last_contact: NaiveDate,
    /// Keep a reminder scheduled for the next due date.
    pub reminder: bool,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn next_due_date(&self) -> Result<NaiveDate, CadenceError> {
        cadence::next_due_date(self.last_contact, self.cadence)
    }

    /// Unrepresentable due dates lie beyond any `today`, so they are never overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.next_due_date()
            .map(|due| cadence::is_overdue(due, today))
            .unwrap_or(false)
    }
}

/// One logged meeting with a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub contact_id: String,
    pub date: NaiveDate,
    pub mood: Mood,
    pub notes: String,
}

/// Input for creating a contact.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub is_favorite: bool,
    pub cadence: Cadence,
    pub last_contact: NaiveDate,
    pub reminder: bool,
    /// Mood and notes for the meeting logged at `last_contact`. Without one
    /// the meeting gets the default mood and no notes.
    pub first_meeting: Option<MeetingDraft>,
}

impl NewContact {
    pub fn new(name: impl Into<String>, cadence: Cadence, last_contact: NaiveDate) -> Self {
        Self {
            name: name.into(),
            birthday: None,
            is_favorite: false,
            cadence,
            last_contact,
            reminder: true,
            first_meeting: None,
        }
    }
}

/// Field changes for an existing contact. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ContactEdit {
    pub name: Option<String>,
    pub birthday: Option<Option<NaiveDate>>,
    pub cadence: Option<Cadence>,
    pub reminder: Option<bool>,
    pub initial_contact: Option<NaiveDate>,
}

/// Date, mood and notes of a meeting being logged or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingDraft {
    pub date: NaiveDate,
    pub mood: Mood,
    pub notes: String,
}

impl MeetingDraft {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            mood: Mood::default(),
            notes: String::new(),
        }
    }
}

/// Trimmed, non-empty contact name.
pub(crate) fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "name" });
    }
    Ok(trimmed.to_string())
}
