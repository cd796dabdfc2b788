//! Integration tests for the contact lifecycle across storage and reminders.
//!
//! These tests drive a `ContactBook`, persist its events to a file-backed
//! database, reopen it and check reminders follow along.

use chrono::NaiveDate;
use tempfile::TempDir;
use touchbase_core::storage::DB_FILE;
use touchbase_core::{
    Cadence, ContactDb, ContactEdit, ListQuery, MeetingDraft, Mood, NewContact, OrderMode,
    ReminderOutbox, ReminderSync, ReminderTime,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Store {
    _dir: TempDir,
    db: ContactDb,
    outbox: ReminderOutbox,
}

impl Store {
    fn open(dir: TempDir) -> Self {
        let path = dir.path().join(DB_FILE);
        let db = ContactDb::open_at(&path).unwrap();
        let outbox = ReminderOutbox::open_at(&path).unwrap();
        Self {
            _dir: dir,
            db,
            outbox,
        }
    }

    fn commit(&mut self, book: &mut touchbase_core::ContactBook) {
        let events = book.drain_events();
        self.db.apply_events(&events).unwrap();
        ReminderSync::new(ReminderTime::default())
            .apply(&events, &mut self.outbox)
            .unwrap();
    }
}

#[test]
fn test_contact_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE);
    let mut store = Store::open(dir);
    let mut book = store.db.load_book().unwrap();

    let mut new = NewContact::new("Anna", Cadence::weeks(2).unwrap(), date(2024, 1, 1));
    new.birthday = Some(date(1990, 5, 17));
    new.first_meeting = Some(MeetingDraft {
        date: date(2024, 1, 1),
        mood: Mood::Good,
        notes: "coffee".into(),
    });
    let anna = book.create_contact(new).unwrap();
    store.commit(&mut book);

    let reopened = ContactDb::open_at(&path).unwrap().load_book().unwrap();
    let loaded = reopened.contact(&anna.id).unwrap();
    assert_eq!(loaded, &anna);
    assert_eq!(loaded.next_due_date().unwrap(), date(2024, 1, 15));
    let meetings = reopened.meetings_for(&anna.id);
    assert_eq!(meetings.len(), 1);
    assert_eq!(meetings[0].notes, "coffee");
}

#[test]
fn test_meetings_drive_last_contact_and_reminder() {
    let mut store = Store::open(TempDir::new().unwrap());
    let mut book = store.db.load_book().unwrap();

    let bob = book
        .create_contact(NewContact::new("Bob", Cadence::months(1).unwrap(), date(2024, 1, 31)))
        .unwrap();
    store.commit(&mut book);
    let pending = store.outbox.pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].trigger, date(2024, 2, 29).and_hms_opt(9, 15, 0).unwrap());

    let later = book.add_meeting(&bob.id, MeetingDraft::on(date(2024, 3, 10))).unwrap();
    book.add_meeting(&bob.id, MeetingDraft::on(date(2024, 2, 1))).unwrap();
    store.commit(&mut book);
    assert_eq!(book.contact(&bob.id).unwrap().last_contact, date(2024, 3, 10));
    assert_eq!(
        store.outbox.pending().unwrap()[0].trigger.date(),
        date(2024, 4, 10)
    );

    book.delete_meeting(&later.id).unwrap();
    store.commit(&mut book);
    let reloaded = store.db.load_book().unwrap();
    assert_eq!(reloaded.contact(&bob.id).unwrap().last_contact, date(2024, 2, 1));
    assert_eq!(
        store.outbox.pending().unwrap()[0].trigger.date(),
        date(2024, 3, 1)
    );
}

#[test]
fn test_reminder_toggle_and_delete() {
    let mut store = Store::open(TempDir::new().unwrap());
    let mut book = store.db.load_book().unwrap();

    let carl = book
        .create_contact(NewContact::new("Carl", Cadence::days(3).unwrap(), date(2024, 6, 1)))
        .unwrap();
    store.commit(&mut book);
    assert_eq!(store.outbox.pending().unwrap().len(), 1);

    book.edit_contact(
        &carl.id,
        ContactEdit {
            reminder: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    store.commit(&mut book);
    assert!(store.outbox.pending().unwrap().is_empty());

    book.edit_contact(
        &carl.id,
        ContactEdit {
            reminder: Some(true),
            ..Default::default()
        },
    )
    .unwrap();
    book.add_meeting(&carl.id, MeetingDraft::on(date(2024, 6, 2))).unwrap();
    store.commit(&mut book);
    assert_eq!(store.outbox.pending().unwrap().len(), 1);

    book.delete_contact(&carl.id).unwrap();
    store.commit(&mut book);
    assert!(store.outbox.pending().unwrap().is_empty());
    let reloaded = store.db.load_book().unwrap();
    assert!(reloaded.contacts().is_empty());
    assert!(store.db.list_meetings(&carl.id).unwrap().is_empty());
}

#[test]
fn test_due_list_after_reload() {
    let mut store = Store::open(TempDir::new().unwrap());
    let mut book = store.db.load_book().unwrap();
    for (name, last) in [
        ("Dana", date(2024, 1, 1)),
        ("Eve", date(2024, 1, 5)),
        ("Finn", date(2024, 1, 20)),
    ] {
        book.create_contact(NewContact::new(name, Cadence::weeks(1).unwrap(), last))
            .unwrap();
    }
    store.commit(&mut book);

    let reloaded = store.db.load_book().unwrap();
    let due = reloaded.visible(&ListQuery::ordered(OrderMode::DueDate), date(2024, 1, 15));
    let names: Vec<&str> = due.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Dana", "Eve"]);
}

#[test]
fn test_reconcile_repairs_missed_reminder_sync() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE);
    let mut store = Store::open(dir);
    let mut book = store.db.load_book().unwrap();

    let gus = book
        .create_contact(NewContact::new("Gus", Cadence::weeks(1).unwrap(), date(2024, 2, 1)))
        .unwrap();
    book.add_meeting(&gus.id, MeetingDraft::on(date(2024, 2, 20))).unwrap();
    // Persist the contact change but never sync the outbox.
    store.db.apply_events(&book.drain_events()).unwrap();
    assert!(store.outbox.pending().unwrap().is_empty());

    let reloaded = ContactDb::open_at(&path).unwrap().load_book().unwrap();
    let mut outbox = ReminderOutbox::open_at(&path).unwrap();
    assert_eq!(outbox.reconcile(reloaded.contacts(), ReminderTime::default()).unwrap(), 1);
    let pending = outbox.pending().unwrap();
    assert_eq!(pending[0].id, gus.id);
    assert_eq!(pending[0].trigger, date(2024, 2, 27).and_hms_opt(9, 15, 0).unwrap());
}
