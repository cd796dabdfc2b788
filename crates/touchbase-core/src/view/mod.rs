//! Ordering, filtering and search over a contact list.
//!
//! These are pure functions: they borrow the collection and return a new
//! vector. Callers re-run them after every change to the collection.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::error::ValidationError;
use crate::phrase::Locale;

/// How the contact list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderMode {
    #[default]
    Alphabetical,
    Backwards,
    DueDate,
    Favorites,
}

impl OrderMode {
    pub const ALL: [OrderMode; 4] = [
        OrderMode::Alphabetical,
        OrderMode::Backwards,
        OrderMode::DueDate,
        OrderMode::Favorites,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OrderMode::Alphabetical => "A-Z",
            OrderMode::Backwards => "Z-A",
            OrderMode::DueDate => "Due date",
            OrderMode::Favorites => "Favorites",
        }
    }

    fn key(self) -> &'static str {
        match self {
            OrderMode::Alphabetical => "alphabetical",
            OrderMode::Backwards => "backwards",
            OrderMode::DueDate => "due_date",
            OrderMode::Favorites => "favorites",
        }
    }
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for OrderMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "alphabetical" | "a_z" => Ok(OrderMode::Alphabetical),
            "backwards" | "z_a" => Ok(OrderMode::Backwards),
            "due_date" | "due" => Ok(OrderMode::DueDate),
            "favorites" | "favourites" => Ok(OrderMode::Favorites),
            _ => Err(ValidationError::InvalidValue {
                field: "order".into(),
                message: format!(
                    "unknown order '{s}' (expected alphabetical, backwards, due_date or favorites)"
                ),
            }),
        }
    }
}

/// Names compare case-insensitively; equal keys keep their input order.
fn compare_names(a: &Contact, b: &Contact) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Present `contacts` in `mode`. `today` decides which contacts are due.
pub fn order(contacts: &[Contact], mode: OrderMode, today: NaiveDate) -> Vec<Contact> {
    match mode {
        OrderMode::Alphabetical => {
            let mut out = contacts.to_vec();
            out.sort_by(compare_names);
            out
        }
        OrderMode::Backwards => {
            let mut out = contacts.to_vec();
            out.sort_by(|a, b| compare_names(b, a));
            out
        }
        OrderMode::DueDate => {
            let mut due: Vec<(NaiveDate, Contact)> = contacts
                .iter()
                .filter_map(|c| {
                    let next = c.next_due_date().ok()?;
                    (next <= today).then(|| (next, c.clone()))
                })
                .collect();
            due.sort_by_key(|(next, _)| *next);
            due.into_iter().map(|(_, c)| c).collect()
        }
        OrderMode::Favorites => contacts.iter().filter(|c| c.is_favorite).cloned().collect(),
    }
}

/// Contacts whose name contains `query`, ignoring case.
///
/// An empty query matches nothing; whether the user is searching at all is
/// decided by the caller (see [`ListQuery`]).
pub fn search(contacts: &[Contact], query: &str) -> Vec<Contact> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    contacts
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// What the contact list screen asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub order: OrderMode,
    /// `Some` while the user is searching, even if the text is still empty.
    pub search: Option<String>,
}

impl ListQuery {
    pub fn ordered(order: OrderMode) -> Self {
        Self {
            order,
            search: None,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }
}

/// The list as displayed: ordered, then narrowed by the search text when searching.
pub fn visible(contacts: &[Contact], query: &ListQuery, today: NaiveDate) -> Vec<Contact> {
    let ordered = order(contacts, query.order, today);
    match &query.search {
        Some(text) => search(&ordered, text),
        None => ordered,
    }
}

/// Message shown when [`visible`] comes back empty.
pub fn empty_list_message(query: &ListQuery, locale: Locale) -> &'static str {
    match (locale, query.is_searching(), query.order) {
        (Locale::En, true, _) => "No contacts match your search.",
        (Locale::En, false, OrderMode::Favorites) => {
            "You have no favorite contacts yet. Mark someone as a favorite to see them here."
        }
        (Locale::En, false, OrderMode::DueDate) => "Nobody is due for a catch-up. Nice work!",
        (Locale::En, false, _) => {
            "There are no contacts yet. Add your first contact to get started."
        }
        (Locale::Ru, true, _) => "Нет контактов, подходящих под поиск.",
        (Locale::Ru, false, OrderMode::Favorites) => "В избранном пока нет ни одного контакта.",
        (Locale::Ru, false, OrderMode::DueDate) => "Сейчас никому не нужно звонить.",
        (Locale::Ru, false, _) => "В вашем списке пока нет ни одного контакта.",
    }
}
