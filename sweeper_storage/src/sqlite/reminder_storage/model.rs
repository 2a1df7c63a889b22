use sweeper_models::{
    chrono::DateTime,
    reminder::Reminder,
    user::{PushSubscription, User},
};

use super::SqliteStoreError;

#[derive(Debug, sqlx::FromRow)]
pub struct ReminderStorageModel {
    pub id: i64,
    pub user_id: String,
    pub fire_at: i64,
    pub note_id: Option<String>,
    pub note_title: Option<String>,
    pub message: String,
    pub is_sent: bool,
}

impl TryFrom<ReminderStorageModel> for Reminder {
    type Error = SqliteStoreError;

    fn try_from(value: ReminderStorageModel) -> Result<Self, Self::Error> {
        let fire_at = DateTime::from_timestamp_millis(value.fire_at)
            .ok_or(SqliteStoreError::InvalidFireTime(value.id, value.fire_at))?;

        Ok(Self {
            id: value.id,
            user_id: value.user_id,
            fire_at,
            note_id: value.note_id,
            note_title: value.note_title,
            message: value.message,
            is_sent: value.is_sent,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserStorageModel {
    pub id: String,
    pub push_subscriptions: Option<String>,
}

impl TryFrom<UserStorageModel> for User {
    type Error = SqliteStoreError;

    fn try_from(value: UserStorageModel) -> Result<Self, Self::Error> {
        let push_subscriptions = parse_subscriptions(&value.id, value.push_subscriptions)?;

        Ok(Self {
            id: value.id,
            push_subscriptions,
        })
    }
}

/// Anything other than a JSON array counts as "no subscriptions"; entries of an
/// array must all be well-formed.
fn parse_subscriptions(
    user_id: &str,
    raw: Option<String>,
) -> Result<Vec<PushSubscription>, SqliteStoreError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Push subscriptions of user {user_id} are not valid JSON: {e}");
            return Ok(Vec::new());
        }
    };

    if !value.is_array() {
        log::warn!("Push subscriptions of user {user_id} are not a list, ignoring them");
        return Ok(Vec::new());
    }

    serde_json::from_value(value)
        .map_err(|source| SqliteStoreError::MalformedSubscription(user_id.to_string(), source))
}
