use std::fmt;

use serde::Deserialize;

/// Application server identity used to sign every push request (RFC 8292).
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct VapidCredentials {
    /// Uncompressed P-256 public key, URL-safe base64.
    pub public_key: String,
    /// Raw P-256 private scalar, URL-safe base64.
    pub private_key: String,
    /// Contact for the push service, `mailto:` or `https:` URL.
    pub subject: String,
}

impl fmt::Debug for VapidCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidCredentials")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}
