use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Rider,
    Driver,
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SenderRole::Rider => "rider",
            SenderRole::Driver => "driver",
        })
    }
}

/// One chat line between the rider and the driver of a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub ride_id: u64,
    pub sender: SenderRole,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub ride_id: u64,
    pub sender: SenderRole,
    pub content: String,
}

impl Record for Message {
    const COLLECTION: &'static str = "messages";

    type Draft = MessageDraft;
    /// Messages are append-only; an update changes nothing.
    type Patch = ();

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: MessageDraft) -> Self {
        Message {
            id,
            ride_id: draft.ride_id,
            sender: draft.sender,
            content: draft.content,
            sent_at: Utc::now(),
        }
    }

    fn apply(&mut self, _patch: ()) {}
}
