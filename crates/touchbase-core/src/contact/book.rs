//! In-memory contact collection with write-time invariants.
//!
//! `ContactBook` owns every contact and meeting. Each mutation validates its
//! input, recomputes the owning contact's `last_contact` from its meetings,
//! and queues [`Event`]s that callers drain to persist the change and to
//! reschedule reminders.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use super::{validate_name, Contact, ContactEdit, Meeting, MeetingDraft, NewContact};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::view::{self, ListQuery};

#[derive(Debug, Default)]
pub struct ContactBook {
    contacts: Vec<Contact>,
    meetings: HashMap<String, Vec<Meeting>>,
    events: Vec<Event>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from stored records.
    ///
    /// Meetings whose contact is missing are dropped, and every contact's
    /// `last_contact` is recomputed so loaded data satisfies the invariant.
    pub fn from_records(contacts: Vec<Contact>, meetings: Vec<Meeting>) -> Self {
        let mut book = Self {
            contacts,
            meetings: HashMap::new(),
            events: Vec::new(),
        };
        for meeting in meetings {
            if book.index_of(&meeting.contact_id).is_some() {
                book.meetings
                    .entry(meeting.contact_id.clone())
                    .or_default()
                    .push(meeting);
            } else {
                debug!(meeting_id = %meeting.id, "dropping meeting of unknown contact");
            }
        }
        for idx in 0..book.contacts.len() {
            let last = book.computed_last_contact(&book.contacts[idx]);
            book.contacts[idx].last_contact = last;
        }
        book
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contact(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve_contact_id(&self, id_or_prefix: &str) -> Result<String> {
        resolve_prefix(
            self.contacts.iter().map(|c| c.id.as_str()),
            id_or_prefix,
            || CoreError::contact_not_found(id_or_prefix),
        )
    }

    /// Resolve a full meeting id or a unique prefix.
    pub fn resolve_meeting_id(&self, id_or_prefix: &str) -> Result<String> {
        resolve_prefix(
            self.meetings.values().flatten().map(|m| m.id.as_str()),
            id_or_prefix,
            || CoreError::meeting_not_found(id_or_prefix),
        )
    }

    /// Meetings of a contact, newest first.
    pub fn meetings_for(&self, contact_id: &str) -> Vec<Meeting> {
        let mut out = self.meetings.get(contact_id).cloned().unwrap_or_default();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out
    }

    pub fn meeting(&self, id: &str) -> Option<&Meeting> {
        self.meetings.values().flatten().find(|m| m.id == id)
    }

    pub fn visible(&self, query: &ListQuery, today: NaiveDate) -> Vec<Contact> {
        view::visible(&self.contacts, query, today)
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // === Contact operations ===

    pub fn create_contact(&mut self, new: NewContact) -> Result<Contact> {
        let name = validate_name(&new.name)?;
        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            name,
            birthday: new.birthday,
            is_favorite: new.is_favorite,
            cadence: new.cadence,
            initial_contact: new.last_contact,
            last_contact: new.last_contact,
            reminder: new.reminder,
            created_at: Utc::now(),
        };
        debug!(contact_id = %contact.id, name = %contact.name, "contact created");
        self.contacts.push(contact.clone());
        self.push_contact_saved(&contact.id);

        // The last contact is always on record as a meeting, so later
        // meetings dated before it cannot move it back.
        let draft = new
            .first_meeting
            .unwrap_or_else(|| MeetingDraft::on(new.last_contact));
        self.add_meeting(
            &contact.id,
            MeetingDraft {
                date: new.last_contact,
                ..draft
            },
        )?;
        self.contact(&contact.id)
            .cloned()
            .ok_or_else(|| CoreError::contact_not_found(&contact.id))
    }

    pub fn edit_contact(&mut self, id: &str, edit: ContactEdit) -> Result<Contact> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CoreError::contact_not_found(id))?;
        let name = edit.name.as_deref().map(validate_name).transpose()?;

        let contact = &mut self.contacts[idx];
        if let Some(name) = name {
            contact.name = name;
        }
        if let Some(birthday) = edit.birthday {
            contact.birthday = birthday;
        }
        if let Some(cadence) = edit.cadence {
            contact.cadence = cadence;
        }
        if let Some(reminder) = edit.reminder {
            contact.reminder = reminder;
        }
        if let Some(initial) = edit.initial_contact {
            contact.initial_contact = initial;
        }
        self.refresh_last_contact(idx);
        self.push_contact_saved(id);
        Ok(self.contacts[idx].clone())
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Result<Contact> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CoreError::contact_not_found(id))?;
        self.contacts[idx].is_favorite = !self.contacts[idx].is_favorite;
        self.push_contact_saved(id);
        Ok(self.contacts[idx].clone())
    }

    /// Remove a contact and all of its meetings.
    pub fn delete_contact(&mut self, id: &str) -> Result<Contact> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CoreError::contact_not_found(id))?;
        let contact = self.contacts.remove(idx);
        let meeting_ids = self
            .meetings
            .remove(id)
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.id)
            .collect::<Vec<_>>();
        debug!(contact_id = %id, meetings = meeting_ids.len(), "contact deleted");
        self.events.push(Event::ContactDeleted {
            id: contact.id.clone(),
            meeting_ids,
            at: Utc::now(),
        });
        Ok(contact)
    }

    // === Meeting operations ===

    pub fn add_meeting(&mut self, contact_id: &str, draft: MeetingDraft) -> Result<Meeting> {
        let idx = self
            .index_of(contact_id)
            .ok_or_else(|| CoreError::contact_not_found(contact_id))?;
        let meeting = Meeting {
            id: Uuid::new_v4().to_string(),
            contact_id: contact_id.to_string(),
            date: draft.date,
            mood: draft.mood,
            notes: draft.notes,
        };
        self.meetings
            .entry(contact_id.to_string())
            .or_default()
            .push(meeting.clone());
        self.events.push(Event::MeetingSaved {
            meeting: meeting.clone(),
            at: Utc::now(),
        });
        if self.refresh_last_contact(idx) {
            self.push_contact_saved(contact_id);
        }
        Ok(meeting)
    }

    pub fn edit_meeting(&mut self, meeting_id: &str, draft: MeetingDraft) -> Result<Meeting> {
        let meeting = self
            .meetings
            .values_mut()
            .flatten()
            .find(|m| m.id == meeting_id)
            .ok_or_else(|| CoreError::meeting_not_found(meeting_id))?;
        meeting.date = draft.date;
        meeting.mood = draft.mood;
        meeting.notes = draft.notes;
        let meeting = meeting.clone();

        self.events.push(Event::MeetingSaved {
            meeting: meeting.clone(),
            at: Utc::now(),
        });
        if let Some(idx) = self.index_of(&meeting.contact_id) {
            if self.refresh_last_contact(idx) {
                self.push_contact_saved(&meeting.contact_id);
            }
        }
        Ok(meeting)
    }

    pub fn delete_meeting(&mut self, meeting_id: &str) -> Result<Meeting> {
        let (contact_id, pos) = self
            .meetings
            .iter()
            .find_map(|(cid, list)| {
                list.iter()
                    .position(|m| m.id == meeting_id)
                    .map(|pos| (cid.clone(), pos))
            })
            .ok_or_else(|| CoreError::meeting_not_found(meeting_id))?;
        let meeting = match self.meetings.get_mut(&contact_id) {
            Some(list) => list.remove(pos),
            None => return Err(CoreError::meeting_not_found(meeting_id)),
        };
        if self.meetings.get(&contact_id).is_some_and(Vec::is_empty) {
            self.meetings.remove(&contact_id);
        }

        self.events.push(Event::MeetingDeleted {
            id: meeting.id.clone(),
            contact_id: contact_id.clone(),
            at: Utc::now(),
        });
        if let Some(idx) = self.index_of(&contact_id) {
            if self.refresh_last_contact(idx) {
                self.push_contact_saved(&contact_id);
            }
        }
        Ok(meeting)
    }

    // === Internals ===

    fn index_of(&self, id: &str) -> Option<usize> {
        self.contacts.iter().position(|c| c.id == id)
    }

    fn computed_last_contact(&self, contact: &Contact) -> NaiveDate {
        self.meetings
            .get(&contact.id)
            .and_then(|list| list.iter().map(|m| m.date).max())
            .unwrap_or(contact.initial_contact)
    }

    /// Recompute `last_contact`; true when it moved.
    fn refresh_last_contact(&mut self, idx: usize) -> bool {
        let last = self.computed_last_contact(&self.contacts[idx]);
        let contact = &mut self.contacts[idx];
        if contact.last_contact == last {
            return false;
        }
        debug!(
            contact_id = %contact.id,
            from = %contact.last_contact,
            to = %last,
            "last contact moved"
        );
        contact.last_contact = last;
        true
    }

    fn push_contact_saved(&mut self, id: &str) {
        if let Some(contact) = self.contact(id).cloned() {
            self.events.push(Event::ContactSaved {
                contact,
                at: Utc::now(),
            });
        }
    }
}

fn resolve_prefix<'a>(
    ids: impl Iterator<Item = &'a str>,
    id_or_prefix: &str,
    not_found: impl Fn() -> CoreError,
) -> Result<String> {
    if id_or_prefix.is_empty() {
        return Err(not_found());
    }
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(id_or_prefix)).collect();
    if matches.contains(&id_or_prefix) {
        return Ok(id_or_prefix.to_string());
    }
    match matches.as_slice() {
        [id] => Ok((*id).to_string()),
        [] => Err(not_found()),
        _ => Err(CoreError::Custom(format!(
            "id prefix '{id_or_prefix}' is ambiguous"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::Cadence;
    use crate::contact::Mood;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book_with_ann() -> (ContactBook, String) {
        let mut book = ContactBook::new();
        let ann = book
            .create_contact(NewContact::new(
                "Ann",
                Cadence::weeks(2).unwrap(),
                date(2024, 1, 1),
            ))
            .unwrap();
        book.drain_events();
        (book, ann.id)
    }

    #[test]
    fn later_meeting_moves_last_contact_earlier_does_not() {
        let (mut book, id) = book_with_ann();
        book.add_meeting(&id, MeetingDraft::on(date(2024, 2, 1))).unwrap();
        assert_eq!(book.contact(&id).unwrap().last_contact, date(2024, 2, 1));

        book.add_meeting(&id, MeetingDraft::on(date(2024, 1, 10))).unwrap();
        assert_eq!(book.contact(&id).unwrap().last_contact, date(2024, 2, 1));
    }

    #[test]
    fn deleting_latest_meeting_recomputes() {
        let (mut book, id) = book_with_ann();
        let early = book.add_meeting(&id, MeetingDraft::on(date(2024, 1, 10))).unwrap();
        let late = book.add_meeting(&id, MeetingDraft::on(date(2024, 2, 1))).unwrap();

        book.delete_meeting(&late.id).unwrap();
        assert_eq!(book.contact(&id).unwrap().last_contact, date(2024, 1, 10));

        book.delete_meeting(&early.id).unwrap();
        assert_eq!(book.contact(&id).unwrap().last_contact, date(2024, 1, 1));
        assert_eq!(book.meetings_for(&id).len(), 1);
    }

    #[test]
    fn earlier_meeting_on_new_contact_keeps_last_contact() {
        let (mut book, id) = book_with_ann();
        assert_eq!(book.meetings_for(&id).len(), 1);

        book.add_meeting(&id, MeetingDraft::on(date(2023, 11, 1))).unwrap();
        let ann = book.contact(&id).unwrap();
        assert_eq!(ann.last_contact, date(2024, 1, 1));
        assert_eq!(ann.next_due_date().unwrap(), date(2024, 1, 15));
        assert!(book.drain_events().iter().all(|e| !matches!(e, Event::ContactSaved { .. })));
    }

    #[test]
    fn editing_meeting_past_the_others_moves_last_contact_forward() {
        let (mut book, id) = book_with_ann();
        let m = book.add_meeting(&id, MeetingDraft::on(date(2023, 12, 1))).unwrap();
        book.add_meeting(&id, MeetingDraft::on(date(2024, 1, 20))).unwrap();
        book.drain_events();

        book.edit_meeting(&m.id, MeetingDraft::on(date(2024, 2, 10))).unwrap();
        assert_eq!(book.contact(&id).unwrap().last_contact, date(2024, 2, 10));
        assert!(matches!(
            book.drain_events().as_slice(),
            [Event::MeetingSaved { .. }, Event::ContactSaved { contact, .. }]
                if contact.last_contact == date(2024, 2, 10)
        ));
    }

    #[test]
    fn deleting_every_meeting_falls_back_to_initial_contact() {
        let (mut book, id) = book_with_ann();
        let edit = ContactEdit {
            initial_contact: Some(date(2023, 12, 24)),
            ..ContactEdit::default()
        };
        assert_eq!(book.edit_contact(&id, edit).unwrap().last_contact, date(2024, 1, 1));

        for m in book.meetings_for(&id) {
            book.delete_meeting(&m.id).unwrap();
        }
        assert_eq!(book.contact(&id).unwrap().last_contact, date(2023, 12, 24));
    }

    #[test]
    fn editing_meeting_date_recomputes() {
        let (mut book, id) = book_with_ann();
        let m = book.add_meeting(&id, MeetingDraft::on(date(2024, 3, 1))).unwrap();
        book.add_meeting(&id, MeetingDraft::on(date(2024, 2, 1))).unwrap();
        book.edit_meeting(
            &m.id,
            MeetingDraft {
                date: date(2024, 1, 5),
                mood: Mood::Good,
                notes: "coffee".into(),
            },
        )
        .unwrap();
        assert_eq!(book.contact(&id).unwrap().last_contact, date(2024, 2, 1));
        assert_eq!(book.meeting(&m.id).unwrap().notes, "coffee");
    }

    #[test]
    fn first_meeting_is_logged_at_last_contact() {
        let mut book = ContactBook::new();
        let mut new = NewContact::new("Bo", Cadence::days(3).unwrap(), date(2024, 4, 4));
        new.first_meeting = Some(MeetingDraft {
            date: date(1999, 1, 1),
            mood: Mood::VeryGood,
            notes: "met at the park".into(),
        });
        let bo = book.create_contact(new).unwrap();
        let meetings = book.meetings_for(&bo.id);
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].date, date(2024, 4, 4));
        assert_eq!(bo.last_contact, date(2024, 4, 4));
    }

    #[test]
    fn delete_contact_cascades_and_reports_meetings() {
        let (mut book, id) = book_with_ann();
        let m = book.add_meeting(&id, MeetingDraft::on(date(2024, 2, 1))).unwrap();
        book.drain_events();

        book.delete_contact(&id).unwrap();
        assert!(book.contact(&id).is_none());
        assert!(book.meeting(&m.id).is_none());
        match book.drain_events().as_slice() {
            [Event::ContactDeleted { meeting_ids, .. }] => {
                assert_eq!(meeting_ids.len(), 2);
                assert!(meeting_ids.contains(&m.id));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn mutations_emit_contact_saved() {
        let (mut book, id) = book_with_ann();
        book.toggle_favorite(&id).unwrap();
        let events = book.drain_events();
        assert!(matches!(
            events.as_slice(),
            [Event::ContactSaved { contact, .. }] if contact.is_favorite
        ));
        assert!(book.drain_events().is_empty());
    }

    #[test]
    fn edit_rejects_blank_name_and_unknown_id() {
        let (mut book, id) = book_with_ann();
        let blank = ContactEdit {
            name: Some("  ".into()),
            ..ContactEdit::default()
        };
        assert!(book.edit_contact(&id, blank).is_err());
        assert_eq!(book.contact(&id).unwrap().name, "Ann");
        assert!(matches!(
            book.edit_contact("nope", ContactEdit::default()),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn prefix_resolution() {
        let (book, id) = book_with_ann();
        assert_eq!(book.resolve_contact_id(&id[..6]).unwrap(), id);
        assert!(book.resolve_contact_id("zzzz-not-there").is_err());
        assert!(book.resolve_contact_id("").is_err());
    }

    #[test]
    fn from_records_repairs_last_contact() {
        let (book, id) = book_with_ann();
        let mut contacts = book.contacts().to_vec();
        contacts[0].last_contact = date(2000, 1, 1);
        let meeting = Meeting {
            id: "m1".into(),
            contact_id: id.clone(),
            date: date(2024, 6, 1),
            mood: Mood::Bad,
            notes: String::new(),
        };
        let orphan = Meeting {
            contact_id: "ghost".into(),
            id: "m2".into(),
            ..meeting.clone()
        };
        let book = ContactBook::from_records(contacts, vec![meeting, orphan]);
        assert_eq!(book.contact(&id).unwrap().last_contact, date(2024, 6, 1));
        assert!(book.meeting("m2").is_none());
    }
}
