use async_trait::async_trait;
use sweeper_models::{
    chrono::{DateTime, Utc},
    reminder::{Reminder, ReminderId},
    user::{User, UserId},
};

#[async_trait]
pub trait ReminderStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reminders of every owner with `fire_at <= now` that were not sent yet. Unordered.
    async fn find_due_unsent_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reminder>, Self::Error>;

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Self::Error>;

    /// Flips the sent flag of every given reminder in one transaction. Either all
    /// of them are updated or none is.
    async fn mark_sent(&self, reminders: &[ReminderId]) -> Result<(), Self::Error>;
}
