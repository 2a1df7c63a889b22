use serde::{Deserialize, Serialize};

pub type UserId = String;

/// Keys issued by the browser alongside a push endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A single push channel in the shape of `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: PushKeys,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub push_subscriptions: Vec<PushSubscription>,
}

impl User {
    pub fn has_subscriptions(&self) -> bool {
        !self.push_subscriptions.is_empty()
    }
}
