use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sweeper_models::user::PushSubscription;
use web_push::{
    ContentEncoding, HyperWebPushClient, PartialVapidSignatureBuilder, SubscriptionInfo,
    VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessageBuilder,
};

use crate::{DispatchError, NotificationDispatcher, VapidCredentials};

const NOTIFICATION_TTL_SECS: u32 = 24 * 60 * 60;

/// Web Push transport signed with the process' VAPID identity.
///
/// Built once at startup through [`WebPushDispatcher::configure`] and shared
/// read-only afterwards; the credentials cannot change while sends are in flight.
pub struct WebPushDispatcher {
    client: HyperWebPushClient,
    signer: PartialVapidSignatureBuilder,
    subject: String,
}

impl WebPushDispatcher {
    pub fn configure(credentials: VapidCredentials) -> Result<Self, DispatchError> {
        let VapidCredentials {
            public_key,
            private_key,
            subject,
        } = credentials;

        let signer =
            VapidSignatureBuilder::from_base64_no_sub(&private_key, web_push::URL_SAFE_NO_PAD)
                .map_err(|e| DispatchError::Configuration(format!("private key: {e}")))?;

        let expected_public_key = decode_key(&public_key)
            .map_err(|e| DispatchError::Configuration(format!("public key: {e}")))?;
        if signer.get_public_key() != expected_public_key {
            return Err(DispatchError::Configuration(
                "public key does not match the private key".to_string(),
            ));
        }

        if subject.trim().is_empty() {
            return Err(DispatchError::Configuration(
                "contact subject is empty".to_string(),
            ));
        }

        log::info!("Configured web push dispatcher for {subject}");

        Ok(Self {
            client: HyperWebPushClient::new(),
            signer,
            subject,
        })
    }
}

#[async_trait]
impl NotificationDispatcher for WebPushDispatcher {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), DispatchError> {
        let info = SubscriptionInfo::new(
            subscription.endpoint.as_str(),
            subscription.keys.p256dh.as_str(),
            subscription.keys.auth.as_str(),
        );

        let mut signature = self.signer.clone().add_sub_info(&info);
        signature.add_claim("sub", self.subject.as_str());
        let signature = signature.build().map_err(classify)?;

        let mut message = WebPushMessageBuilder::new(&info);
        message.set_ttl(NOTIFICATION_TTL_SECS);
        message.set_payload(ContentEncoding::Aes128Gcm, payload);
        message.set_vapid_signature(signature);
        let message = message.build().map_err(classify)?;

        self.client.send(message).await.map_err(classify)
    }
}

fn decode_key(key: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(key.trim().trim_end_matches('='))
}

fn classify(error: WebPushError) -> DispatchError {
    match error {
        WebPushError::EndpointNotValid | WebPushError::EndpointNotFound => {
            DispatchError::ExpiredSubscription
        }
        WebPushError::InvalidUri
        | WebPushError::MissingCryptoKeys
        | WebPushError::InvalidCryptoKeys => DispatchError::InvalidSubscription(error.to_string()),
        WebPushError::PayloadTooLarge => DispatchError::PayloadTooLarge,
        WebPushError::InvalidClaims | WebPushError::Unauthorized => {
            DispatchError::Configuration(error.to_string())
        }
        WebPushError::Unspecified
        | WebPushError::IoError
        | WebPushError::TlsError
        | WebPushError::SslError => DispatchError::Network(error.to_string()),
        other => DispatchError::Rejected(other.to_string()),
    }
}
