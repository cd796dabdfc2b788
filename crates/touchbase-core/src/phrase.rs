//! Human-readable "time since" and "time until" phrases.
//!
//! All pluralization goes through [`plural`], so adding a locale means
//! adding one rule there and the word forms below.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Display language for generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => f.write_str("en"),
            Locale::Ru => f.write_str("ru"),
        }
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "ru" | "russian" => Ok(Locale::Ru),
            other => Err(ValidationError::InvalidValue {
                field: "locale".into(),
                message: format!("unsupported locale '{other}'"),
            }),
        }
    }
}

/// Plural category of a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    One,
    Few,
    Many,
}

/// CLDR cardinal category of `n` in `locale`.
///
/// English only distinguishes one/other (reported as `Many`). Russian uses
/// the noun-case split: 1, 21, 101 take `One`; 2-4, 22-24 take `Few`;
/// 11-14 and everything else take `Many`.
pub fn plural_category(n: i64, locale: Locale) -> PluralCategory {
    let n = n.unsigned_abs();
    match locale {
        Locale::En => {
            if n == 1 {
                PluralCategory::One
            } else {
                PluralCategory::Many
            }
        }
        Locale::Ru => {
            let (last, last_two) = (n % 10, n % 100);
            if last == 1 && last_two != 11 {
                PluralCategory::One
            } else if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
                PluralCategory::Few
            } else {
                PluralCategory::Many
            }
        }
    }
}

/// Pick the word form for `n`.
pub fn plural<'a>(n: i64, one: &'a str, few: &'a str, many: &'a str, locale: Locale) -> &'a str {
    match plural_category(n, locale) {
        PluralCategory::One => one,
        PluralCategory::Few => few,
        PluralCategory::Many => many,
    }
}

fn days_word(n: i64, locale: Locale) -> &'static str {
    match locale {
        Locale::En => plural(n, "day", "days", "days", locale),
        Locale::Ru => plural(n, "день", "дня", "дней", locale),
    }
}

/// Whole-day distance plus its phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elapsed {
    pub days: i64,
    pub text: String,
}

/// Days from `last_contact` to `today` and a phrase such as "3 days ago".
///
/// A last contact in the future yields a negative `days` and an "in N days"
/// phrase.
pub fn elapsed_description(last_contact: NaiveDate, today: NaiveDate, locale: Locale) -> Elapsed {
    let days = (today - last_contact).num_days();
    let abs = days.abs();
    let word = days_word(abs, locale);
    let text = match (locale, days.signum()) {
        (Locale::En, 0) => "today".to_string(),
        (Locale::En, 1) => format!("{abs} {word} ago"),
        (Locale::En, _) => format!("in {abs} {word}"),
        (Locale::Ru, 0) => "сегодня".to_string(),
        (Locale::Ru, 1) => format!("{abs} {word} назад"),
        (Locale::Ru, _) => format!("через {abs} {word}"),
    };
    Elapsed { days, text }
}

/// Days from `today` until `next_due`, phrased as "due in N days" or
/// "overdue by N days".
pub fn due_description(next_due: NaiveDate, today: NaiveDate, locale: Locale) -> Elapsed {
    let days = (next_due - today).num_days();
    let abs = days.abs();
    let word = days_word(abs, locale);
    let text = match (locale, days.signum()) {
        (Locale::En, 0) => "due today".to_string(),
        (Locale::En, 1) => format!("due in {abs} {word}"),
        (Locale::En, _) => format!("overdue by {abs} {word}"),
        (Locale::Ru, 0) => "пора сегодня".to_string(),
        (Locale::Ru, 1) => format!("через {abs} {word}"),
        (Locale::Ru, _) => format!("просрочено на {abs} {word}"),
    };
    Elapsed { days, text }
}
