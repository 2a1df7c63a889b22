use std::collections::HashMap;

use async_trait::async_trait;
use sweeper_models::{
    chrono::{DateTime, Utc},
    reminder::{Reminder, ReminderId},
    user::{User, UserId},
};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::ReminderStore;

#[derive(Debug, Error)]
pub enum InMemoryStoreError {
    #[error("Reminder {0} does not exist")]
    UnknownReminder(ReminderId),
}

#[derive(Default)]
struct InMemoryStore {
    reminders: HashMap<ReminderId, Reminder>,
    users: HashMap<UserId, User>,
}

#[derive(Default)]
pub struct InMemoryReminderStore {
    store: RwLock<InMemoryStore>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_reminder(&self, reminder: Reminder) {
        let mut store = self.store.write().await;
        store.reminders.insert(reminder.id, reminder);
    }

    pub async fn insert_user(&self, user: User) {
        let mut store = self.store.write().await;
        store.users.insert(user.id.clone(), user);
    }

    pub async fn get_reminder(&self, id: ReminderId) -> Option<Reminder> {
        let store = self.store.read().await;
        store.reminders.get(&id).cloned()
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    type Error = InMemoryStoreError;

    async fn find_due_unsent_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reminder>, Self::Error> {
        let store = self.store.read().await;
        Ok(store
            .reminders
            .values()
            .filter(|reminder| reminder.is_due(now))
            .cloned()
            .collect())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Self::Error> {
        let store = self.store.read().await;
        Ok(store.users.get(user_id).cloned())
    }

    async fn mark_sent(&self, reminders: &[ReminderId]) -> Result<(), Self::Error> {
        let mut store = self.store.write().await;

        if let Some(missing) = reminders
            .iter()
            .find(|id| !store.reminders.contains_key(*id))
        {
            return Err(InMemoryStoreError::UnknownReminder(*missing));
        }

        for id in reminders {
            if let Some(reminder) = store.reminders.get_mut(id) {
                reminder.is_sent = true;
            }
        }

        log::debug!("Marked {} reminders as sent", reminders.len());
        Ok(())
    }
}
