use async_trait::async_trait;
use sweeper_models::user::PushSubscription;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Push credentials are invalid: {0}")]
    Configuration(String),

    #[error("Push subscription is invalid: {0}")]
    InvalidSubscription(String),

    #[error("Push subscription has expired or was unsubscribed")]
    ExpiredSubscription,

    #[error("Push service rejected the notification: {0}")]
    Rejected(String),

    #[error("Push service could not be reached: {0}")]
    Network(String),

    #[error("Notification payload is too large")]
    PayloadTooLarge,
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync + 'static {
    /// Makes exactly one delivery attempt. Retrying is up to the caller.
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), DispatchError>;
}
