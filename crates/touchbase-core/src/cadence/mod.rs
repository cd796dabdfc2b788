//! Contact cadence arithmetic.
//!
//! A [`Cadence`] says how often the user wants to be in touch with someone
//! ("every 2 weeks"). The functions here turn a last-contact date and a
//! cadence into a due date, and decide whether that date has arrived.
//!
//! Month and year steps are calendar based. When the target month is shorter
//! than the starting day-of-month the result is clamped to the last day of
//! that month: 2024-01-31 + 1 month is 2024-02-29, and 2024-02-29 + 1 year is
//! 2025-02-28.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CadenceError, ValidationError};

/// Calendar unit a cadence is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceUnit {
    Day,
    Week,
    Month,
    Year,
}

impl CadenceUnit {
    pub const ALL: [CadenceUnit; 4] = [
        CadenceUnit::Day,
        CadenceUnit::Week,
        CadenceUnit::Month,
        CadenceUnit::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CadenceUnit::Day => "day",
            CadenceUnit::Week => "week",
            CadenceUnit::Month => "month",
            CadenceUnit::Year => "year",
        }
    }
}

impl fmt::Display for CadenceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CadenceUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.strip_suffix('s').unwrap_or(&lower) {
            "day" => Ok(CadenceUnit::Day),
            "week" => Ok(CadenceUnit::Week),
            "month" => Ok(CadenceUnit::Month),
            "year" => Ok(CadenceUnit::Year),
            _ => Err(ValidationError::InvalidValue {
                field: "unit".into(),
                message: format!("unknown cadence unit '{s}' (expected day, week, month or year)"),
            }),
        }
    }
}

/// Desired contact frequency: `interval_count` units between contacts.
///
/// Construct through [`Cadence::new`], which rejects a zero interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cadence {
    pub unit: CadenceUnit,
    pub interval_count: u32,
}

impl Cadence {
    pub fn new(unit: CadenceUnit, interval_count: u32) -> Result<Self, ValidationError> {
        if interval_count == 0 {
            return Err(ValidationError::OutOfRange {
                field: "interval_count",
                min: 1,
                max: i64::from(u32::MAX),
                value: 0,
            });
        }
        Ok(Self {
            unit,
            interval_count,
        })
    }

    pub fn days(n: u32) -> Result<Self, ValidationError> {
        Self::new(CadenceUnit::Day, n)
    }

    pub fn weeks(n: u32) -> Result<Self, ValidationError> {
        Self::new(CadenceUnit::Week, n)
    }

    pub fn months(n: u32) -> Result<Self, ValidationError> {
        Self::new(CadenceUnit::Month, n)
    }

    pub fn years(n: u32) -> Result<Self, ValidationError> {
        Self::new(CadenceUnit::Year, n)
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            unit: CadenceUnit::Week,
            interval_count: 1,
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interval_count == 1 {
            write!(f, "every {}", self.unit)
        } else {
            write!(f, "every {} {}s", self.interval_count, self.unit)
        }
    }
}

/// Date the next contact is expected, `interval_count` units after `last_contact`.
///
/// # Errors
/// Returns [`CadenceError::OutOfRange`] if the result cannot be represented.
pub fn next_due_date(last_contact: NaiveDate, cadence: Cadence) -> Result<NaiveDate, CadenceError> {
    let n = cadence.interval_count;
    let advanced = match cadence.unit {
        CadenceUnit::Day => last_contact.checked_add_days(Days::new(u64::from(n))),
        CadenceUnit::Week => last_contact.checked_add_days(Days::new(u64::from(n) * 7)),
        CadenceUnit::Month => last_contact.checked_add_months(Months::new(n)),
        CadenceUnit::Year => n
            .checked_mul(12)
            .and_then(|months| last_contact.checked_add_months(Months::new(months))),
    };
    advanced.ok_or(CadenceError::OutOfRange {
        date: last_contact,
        cadence,
    })
}

/// A contact is overdue once its due date is today or earlier.
pub fn is_overdue(next_due_date: NaiveDate, today: NaiveDate) -> bool {
    next_due_date <= today
}
