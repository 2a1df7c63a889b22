use chrono::{DateTime, Utc};

use crate::user::UserId;

pub type ReminderId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: ReminderId,
    pub user_id: UserId,
    pub fire_at: DateTime<Utc>,
    pub note_id: Option<String>,
    pub note_title: Option<String>,
    pub message: String,
    pub is_sent: bool,
}

impl Reminder {
    /// A reminder is due once its fire time has passed and it has not been sent yet.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.is_sent && self.fire_at <= now
    }

    pub fn note_id(&self) -> Option<&str> {
        self.note_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn note_title(&self) -> Option<&str> {
        self.note_title.as_deref().filter(|title| !title.is_empty())
    }
}
