use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sweeper_models::{
    reminder::{Reminder, ReminderId},
    user::{PushKeys, PushSubscription, User, UserId},
};
use sweeper_push::{DispatchError, NotificationDispatcher};
use sweeper_storage::{InMemoryReminderStore, InMemoryStoreError, ReminderStore};
use thiserror::Error;
use tokio::sync::Barrier;

pub const APP_URL: &str = "https://notes.example.com";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

pub fn reminder(id: ReminderId, user_id: &str, fire_at: DateTime<Utc>) -> Reminder {
    Reminder {
        id,
        user_id: user_id.to_string(),
        fire_at,
        note_id: None,
        note_title: None,
        message: format!("Reminder number {id}"),
        is_sent: false,
    }
}

pub fn subscription(endpoint: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.to_string(),
        keys: PushKeys {
            p256dh: format!("p256dh-{endpoint}"),
            auth: format!("auth-{endpoint}"),
        },
        expiration_time: None,
    }
}

pub fn user(id: &str, endpoints: &[&str]) -> User {
    User {
        id: id.to_string(),
        push_subscriptions: endpoints.iter().map(|e| subscription(e)).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub endpoint: String,
    pub payload: serde_json::Value,
}

/// Records every delivery attempt and fails the ones aimed at `failing_endpoints`.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<SentNotification>>,
    failing_endpoints: HashSet<String>,
    barrier: Option<Arc<Barrier>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(endpoints: &[&str]) -> Self {
        Self {
            failing_endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Every send waits until `parties` sends are in flight at the same time.
    pub fn rendezvous(parties: usize) -> Self {
        Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<_> = self.sent().into_iter().map(|n| n.endpoint).collect();
        endpoints.sort();
        endpoints
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), DispatchError> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        self.sent.lock().unwrap().push(SentNotification {
            endpoint: subscription.endpoint.clone(),
            payload: serde_json::from_slice(payload).unwrap(),
        });

        if self.failing_endpoints.contains(&subscription.endpoint) {
            Err(DispatchError::ExpiredSubscription)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Error)]
pub enum FailingStoreError {
    #[error("injected {0} failure")]
    Injected(&'static str),

    #[error(transparent)]
    Memory(#[from] InMemoryStoreError),
}

/// In-memory store that counts calls and fails on demand.
#[derive(Default)]
pub struct FailingStore {
    pub inner: InMemoryReminderStore,
    pub fail_query: bool,
    pub fail_mark_sent: bool,
    pub failing_users: HashSet<UserId>,
    calls: AtomicUsize,
    mark_sent_batches: Mutex<Vec<Vec<ReminderId>>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn mark_sent_batches(&self) -> Vec<Vec<ReminderId>> {
        self.mark_sent_batches.lock().unwrap().clone()
    }

    pub async fn is_sent(&self, id: ReminderId) -> bool {
        self.inner.get_reminder(id).await.unwrap().is_sent
    }
}

#[async_trait]
impl ReminderStore for FailingStore {
    type Error = FailingStoreError;

    async fn find_due_unsent_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reminder>, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_query {
            return Err(FailingStoreError::Injected("query"));
        }
        Ok(self.inner.find_due_unsent_reminders(now).await?)
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_users.contains(user_id) {
            return Err(FailingStoreError::Injected("user lookup"));
        }
        Ok(self.inner.get_user(user_id).await?)
    }

    async fn mark_sent(&self, reminders: &[ReminderId]) -> Result<(), Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mark_sent {
            return Err(FailingStoreError::Injected("mark sent"));
        }
        self.mark_sent_batches
            .lock()
            .unwrap()
            .push(reminders.to_vec());
        Ok(self.inner.mark_sent(reminders).await?)
    }
}
