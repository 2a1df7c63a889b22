mod model;

use async_trait::async_trait;
use model::{ReminderStorageModel, UserStorageModel};
use sweeper_models::{
    chrono::{DateTime, Utc},
    reminder::{Reminder, ReminderId},
    user::{User, UserId},
};
use thiserror::Error;

use crate::ReminderStore;

#[derive(Debug, Error)]
pub enum SqliteStoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Reminder {0} has an out of range fire time {1}")]
    InvalidFireTime(ReminderId, i64),

    #[error("User {0} has a malformed push subscription: {1}")]
    MalformedSubscription(UserId, #[source] serde_json::Error),

    #[error("Reminder {0} does not exist")]
    UnknownReminder(ReminderId),
}

pub struct SqliteReminderStore {
    pool: sqlx::SqlitePool,
}

impl SqliteReminderStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStore for SqliteReminderStore {
    type Error = SqliteStoreError;

    async fn find_due_unsent_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reminder>, Self::Error> {
        let reminders = sqlx::query_as::<_, ReminderStorageModel>(
            "SELECT id, user_id, fire_at, note_id, note_title, message, is_sent
FROM reminders
WHERE fire_at <= ? AND is_sent = FALSE",
        )
        .bind(now.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders
            .into_iter()
            .filter_map(|model| match Reminder::try_from(model) {
                Ok(reminder) => Some(reminder),
                Err(e) => {
                    log::error!("Skipping unreadable reminder: {e}");
                    None
                }
            })
            .collect())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Self::Error> {
        let user = sqlx::query_as::<_, UserStorageModel>(
            "SELECT id, push_subscriptions FROM users WHERE id = ?",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        user.map(User::try_from).transpose()
    }

    async fn mark_sent(&self, reminders: &[ReminderId]) -> Result<(), Self::Error> {
        if reminders.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for id in reminders {
            let updated = sqlx::query("UPDATE reminders SET is_sent = TRUE WHERE id = ?")
                .bind(*id)
                .execute(&mut *tx)
                .await?;

            if updated.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(SqliteStoreError::UnknownReminder(*id));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
