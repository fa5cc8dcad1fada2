// Razorpay configuration.

use serde::{Deserialize, Serialize};

/// Razorpay credentials. Loaded once at startup; absence means billing
/// endpoints answer with a configuration error instead of panicking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayOptions {
    /// Public key id, shared with the checkout client.
    pub key_id: String,
    /// Secret key: Basic-auth password for the orders API and the HMAC
    /// key for client-callback signature verification.
    pub key_secret: String,
    /// Webhook signing secret.
    pub webhook_secret: String,
}

impl RazorpayOptions {
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            webhook_secret: webhook_secret.into(),
        }
    }

    /// Read credentials from `RAZORPAY_KEY_ID`, `RAZORPAY_KEY_SECRET`,
    /// and `RAZORPAY_WEBHOOK_SECRET`. Returns `None` when the key pair
    /// is missing.
    pub fn from_env() -> Option<Self> {
        let key_id = menuqr_core::env::razorpay_key_id()?;
        let key_secret = menuqr_core::env::razorpay_key_secret()?;
        let webhook_secret = menuqr_core::env::razorpay_webhook_secret().unwrap_or_default();
        Some(Self {
            key_id,
            key_secret,
            webhook_secret,
        })
    }

    /// Whether webhook verification can run.
    pub fn has_webhook_secret(&self) -> bool {
        !self.webhook_secret.is_empty()
    }
}
