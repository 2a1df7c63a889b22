use serde::Serialize;
use sweeper_models::reminder::Reminder;

pub const DEFAULT_TITLE: &str = "You have a reminder!";

/// Builds the deep links a notification opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinks {
    base_url: String,
}

impl DeepLinks {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn note(&self, note_id: &str) -> String {
        format!("{}/notes/{}", self.base_url, note_id)
    }

    pub fn reminders(&self) -> String {
        format!("{}/reminders", self.base_url)
    }
}

/// JSON document handed to the service worker on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub url: String,
}

impl NotificationPayload {
    pub fn for_reminder(reminder: &Reminder, links: &DeepLinks) -> Self {
        let title = match reminder.note_title() {
            Some(title) => format!("Reminder: {title}"),
            None => DEFAULT_TITLE.to_string(),
        };
        let url = match reminder.note_id() {
            Some(note_id) => links.note(note_id),
            None => links.reminders(),
        };

        Self {
            title,
            body: reminder.message.clone(),
            url,
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
