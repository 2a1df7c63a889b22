mod payload;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use sweeper_models::{
    reminder::{Reminder, ReminderId},
    user::PushSubscription,
};
use sweeper_push::{DispatchError, NotificationDispatcher};
use sweeper_storage::ReminderStore;
use thiserror::Error;
use tokio::sync::Mutex;

pub use payload::{DEFAULT_TITLE, DeepLinks, NotificationPayload};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Failed to query due reminders: {0}")]
    Query(#[source] BoxError),

    #[error("Failed to mark {count} reminders as sent: {source}")]
    MarkSent {
        count: usize,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
enum ReminderError {
    #[error("user lookup failed: {0}")]
    UserLookup(#[source] BoxError),

    #[error("payload encoding failed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Outcome of one sweep, reported back to the trigger caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepResult {
    pub success: bool,
    pub message: String,
    /// Reminders marked sent, regardless of how many deliveries succeeded.
    pub processed: usize,
}

impl SweepResult {
    fn nothing_due() -> Self {
        Self {
            success: true,
            message: "No reminders to send.".to_string(),
            processed: 0,
        }
    }

    fn processed(count: usize) -> Self {
        Self {
            success: true,
            message: format!("Processed {count} reminders."),
            processed: count,
        }
    }
}

enum ReminderPlan {
    /// Owner no longer exists; mark sent so the reminder is not picked up again.
    Orphaned,
    /// Owner has nowhere to deliver to; stays unsent and is retried next sweep.
    NoSubscriptions,
    Deliver {
        subscriptions: Vec<PushSubscription>,
        payload: Arc<[u8]>,
    },
}

pub struct ReminderSweepJob<S> {
    store: Arc<S>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    links: DeepLinks,
    sweep_guard: Mutex<()>,
}

impl<S: ReminderStore> ReminderSweepJob<S> {
    pub fn new(store: Arc<S>, dispatcher: Arc<dyn NotificationDispatcher>, app_url: &str) -> Self {
        Self {
            store,
            dispatcher,
            links: DeepLinks::new(app_url),
            sweep_guard: Mutex::new(()),
        }
    }

    pub async fn run(&self) -> Result<SweepResult, SweepError> {
        self.run_at(Utc::now()).await
    }

    /// Runs one sweep treating `now` as the evaluation instant.
    ///
    /// Overlapping calls on the same job wait for each other; the second one only
    /// sees what the first left unsent.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<SweepResult, SweepError> {
        let _sweep = self.sweep_guard.lock().await;
        log::info!("Starting reminder sweep at {now}");

        let due_reminders = self
            .store
            .find_due_unsent_reminders(now)
            .await
            .map_err(|e| SweepError::Query(Box::new(e)))?;

        if due_reminders.is_empty() {
            log::info!("No due reminders found");
            return Ok(SweepResult::nothing_due());
        }

        log::info!("Found {} due reminders", due_reminders.len());

        let mut deliveries = Vec::new();
        let mut reminders_to_mark: Vec<ReminderId> = Vec::new();

        for reminder in &due_reminders {
            match self.plan(reminder).await {
                Ok(ReminderPlan::Orphaned) => {
                    log::warn!(
                        "User {} of reminder {} not found, marking it as sent",
                        reminder.user_id,
                        reminder.id
                    );
                    reminders_to_mark.push(reminder.id);
                }
                Ok(ReminderPlan::NoSubscriptions) => {
                    log::warn!(
                        "No push subscriptions found for user {}, skipping reminder {}",
                        reminder.user_id,
                        reminder.id
                    );
                }
                Ok(ReminderPlan::Deliver {
                    subscriptions,
                    payload,
                }) => {
                    for subscription in subscriptions {
                        deliveries.push(deliver(
                            self.dispatcher.as_ref(),
                            reminder.id,
                            subscription,
                            payload.clone(),
                        ));
                    }
                    reminders_to_mark.push(reminder.id);
                }
                Err(e) => {
                    log::error!(
                        "Failed to process reminder {} for user {}: {e}",
                        reminder.id,
                        reminder.user_id
                    );
                }
            }
        }

        let attempted = deliveries.len();
        let failed = join_all(deliveries)
            .await
            .iter()
            .filter(|outcome| outcome.is_err())
            .count();
        if attempted > 0 {
            log::info!(
                "Delivered {} of {attempted} notifications",
                attempted - failed
            );
        }

        if !reminders_to_mark.is_empty() {
            self.store
                .mark_sent(&reminders_to_mark)
                .await
                .map_err(|e| SweepError::MarkSent {
                    count: reminders_to_mark.len(),
                    source: Box::new(e),
                })?;
            log::info!(
                "Successfully marked {} reminders as sent",
                reminders_to_mark.len()
            );
        }

        Ok(SweepResult::processed(reminders_to_mark.len()))
    }

    async fn plan(&self, reminder: &Reminder) -> Result<ReminderPlan, ReminderError> {
        let user = self
            .store
            .get_user(&reminder.user_id)
            .await
            .map_err(|e| ReminderError::UserLookup(Box::new(e)))?;

        let Some(user) = user else {
            return Ok(ReminderPlan::Orphaned);
        };

        if !user.has_subscriptions() {
            return Ok(ReminderPlan::NoSubscriptions);
        }

        let payload = NotificationPayload::for_reminder(reminder, &self.links).to_bytes()?;

        Ok(ReminderPlan::Deliver {
            subscriptions: user.push_subscriptions,
            payload: payload.into(),
        })
    }
}

async fn deliver(
    dispatcher: &dyn NotificationDispatcher,
    reminder_id: ReminderId,
    subscription: PushSubscription,
    payload: Arc<[u8]>,
) -> Result<(), DispatchError> {
    let result = dispatcher.send(&subscription, &payload).await;
    if let Err(e) = &result {
        log::warn!("Failed to send a notification for reminder {reminder_id}: {e}");
    }
    result
}
