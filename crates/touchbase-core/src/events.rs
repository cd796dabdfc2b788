use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contact::{Contact, Meeting};

/// Every change to a [`ContactBook`](crate::ContactBook) produces an Event.
/// Storage and reminder scheduling consume them after each write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Contact created or changed (including a recomputed last contact).
    ContactSaved {
        contact: Contact,
        at: DateTime<Utc>,
    },
    /// Contact removed together with its meetings.
    ContactDeleted {
        id: String,
        meeting_ids: Vec<String>,
        at: DateTime<Utc>,
    },
    MeetingSaved {
        meeting: Meeting,
        at: DateTime<Utc>,
    },
    MeetingDeleted {
        id: String,
        contact_id: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::ContactSaved { at, .. }
            | Event::ContactDeleted { at, .. }
            | Event::MeetingSaved { at, .. }
            | Event::MeetingDeleted { at, .. } => *at,
        }
    }
}
