//! Reminder planning and the notifier seam.
//!
//! A contact with reminders enabled gets one pending reminder at its next
//! due date. [`ReminderSync`] keeps a [`Notifier`] in step with the events a
//! [`ContactBook`](crate::ContactBook) produces.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contact::Contact;
use crate::error::{ConfigError, Result};
use crate::events::Event;

/// Delivers reminders at a local wall-clock time.
///
/// Scheduling an id that is already pending replaces it.
pub trait Notifier {
    fn schedule(&mut self, id: &str, trigger: NaiveDateTime, title: &str) -> Result<()>;
    fn cancel(&mut self, id: &str) -> Result<()>;
}

/// A reminder ready to hand to a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Same as the contact id, so rescheduling replaces the previous reminder.
    pub id: String,
    pub trigger: NaiveDateTime,
    pub title: String,
}

/// Local time of day reminders fire at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTime {
    time: NaiveTime,
}

impl ReminderTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ConfigError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(|time| Self { time })
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "reminders.hour/minute".into(),
                message: format!("{hour:02}:{minute:02} is not a valid time of day"),
            })
    }

    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.time)
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        Self {
            time: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

pub fn reminder_title(name: &str) -> String {
    format!("It's time to talk to {name}! ⏰")
}

/// The reminder `contact` should have pending, if any.
pub fn plan_reminder(contact: &Contact, at: ReminderTime) -> Option<Reminder> {
    if !contact.reminder {
        return None;
    }
    let due = contact.next_due_date().ok()?;
    Some(Reminder {
        id: contact.id.clone(),
        trigger: at.on(due),
        title: reminder_title(&contact.name),
    })
}

/// Applies contact events to a notifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReminderSync {
    pub at: ReminderTime,
}

impl ReminderSync {
    pub fn new(at: ReminderTime) -> Self {
        Self { at }
    }

    /// Cancel and reschedule reminders touched by `events`.
    ///
    /// Returns the number of reminders scheduled.
    pub fn apply(&self, events: &[Event], notifier: &mut dyn Notifier) -> Result<usize> {
        let mut scheduled = 0;
        for event in events {
            match event {
                Event::ContactSaved { contact, .. } => {
                    notifier.cancel(&contact.id)?;
                    if let Some(reminder) = plan_reminder(contact, self.at) {
                        notifier.schedule(&reminder.id, reminder.trigger, &reminder.title)?;
                        debug!(
                            contact_id = %contact.id,
                            trigger = %reminder.trigger,
                            "reminder scheduled"
                        );
                        scheduled += 1;
                    }
                }
                Event::ContactDeleted { id, .. } => {
                    notifier.cancel(id)?;
                }
                Event::MeetingSaved { .. } | Event::MeetingDeleted { .. } => {}
            }
        }
        if scheduled > 0 {
            info!(scheduled, "reminders updated");
        }
        Ok(scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::Cadence;
    use crate::contact::{ContactBook, MeetingDraft, NewContact};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryNotifier {
        pending: BTreeMap<String, (NaiveDateTime, String)>,
        cancelled: Vec<String>,
    }

    impl Notifier for MemoryNotifier {
        fn schedule(&mut self, id: &str, trigger: NaiveDateTime, title: &str) -> Result<()> {
            self.pending.insert(id.into(), (trigger, title.into()));
            Ok(())
        }

        fn cancel(&mut self, id: &str) -> Result<()> {
            self.pending.remove(id);
            self.cancelled.push(id.into());
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reminder_fires_at_quarter_past_nine_on_due_date() {
        let mut book = ContactBook::new();
        let ann = book
            .create_contact(NewContact::new("Ann", Cadence::weeks(2).unwrap(), date(2024, 1, 1)))
            .unwrap();
        let reminder = plan_reminder(&ann, ReminderTime::default()).unwrap();
        assert_eq!(reminder.trigger, date(2024, 1, 15).and_hms_opt(9, 15, 0).unwrap());
        assert_eq!(reminder.title, "It's time to talk to Ann! ⏰");
    }

    #[test]
    fn disabled_reminder_plans_nothing() {
        let mut book = ContactBook::new();
        let mut new = NewContact::new("Quiet", Cadence::days(1).unwrap(), date(2024, 1, 1));
        new.reminder = false;
        let quiet = book.create_contact(new).unwrap();
        assert!(plan_reminder(&quiet, ReminderTime::default()).is_none());
    }

    #[test]
    fn sync_reschedules_after_meeting_and_cancels_on_delete() {
        let mut book = ContactBook::new();
        let mut notifier = MemoryNotifier::default();
        let sync = ReminderSync::new(ReminderTime::new(18, 0).unwrap());

        let ann = book
            .create_contact(NewContact::new("Ann", Cadence::days(10).unwrap(), date(2024, 1, 1)))
            .unwrap();
        assert_eq!(sync.apply(&book.drain_events(), &mut notifier).unwrap(), 1);
        assert_eq!(
            notifier.pending[&ann.id].0,
            date(2024, 1, 11).and_hms_opt(18, 0, 0).unwrap()
        );

        book.add_meeting(&ann.id, MeetingDraft::on(date(2024, 1, 5))).unwrap();
        sync.apply(&book.drain_events(), &mut notifier).unwrap();
        assert_eq!(
            notifier.pending[&ann.id].0,
            date(2024, 1, 15).and_hms_opt(18, 0, 0).unwrap()
        );

        book.delete_contact(&ann.id).unwrap();
        sync.apply(&book.drain_events(), &mut notifier).unwrap();
        assert!(notifier.pending.is_empty());
    }

    #[test]
    fn invalid_time_rejected() {
        assert!(ReminderTime::new(24, 0).is_err());
        assert!(ReminderTime::new(8, 60).is_err());
    }
}
