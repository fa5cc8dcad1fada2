// Webhook event envelope and helpers.
//
// Only `payment.captured` drives state. The `notes` map on the payment
// entity carries the `userId`/`planType` metadata set at order creation;
// events without usable notes are a logged no-op, never an error back to
// the gateway.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RazorpayError;

/// Header carrying the webhook signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// The single event type that activates subscriptions.
pub const EVENT_PAYMENT_CAPTURED: &str = "payment.captured";

/// Webhook event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub payment: Option<PaymentWrapper>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWrapper {
    pub entity: PaymentEntity,
}

/// The payment entity inside a `payment.captured` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub order_id: String,
    /// Captured amount in paise, as reported by the gateway.
    pub amount: i64,
    #[serde(default)]
    pub notes: HashMap<String, String>,
}

impl WebhookEvent {
    /// Parse a raw (already signature-verified) webhook body.
    pub fn parse(raw_body: &[u8]) -> Result<Self, RazorpayError> {
        serde_json::from_slice(raw_body).map_err(|e| RazorpayError::WebhookBodyInvalid(e.to_string()))
    }

    pub fn is_payment_captured(&self) -> bool {
        self.event == EVENT_PAYMENT_CAPTURED
    }

    /// The captured payment entity, if this event carries one.
    pub fn payment(&self) -> Option<&PaymentEntity> {
        self.payload.payment.as_ref().map(|p| &p.entity)
    }
}

impl PaymentEntity {
    /// Correlation metadata set at order creation. `None` when either
    /// note is missing or empty.
    pub fn correlation(&self) -> Option<(String, String)> {
        let user_id = self.notes.get("userId").filter(|v| !v.is_empty())?;
        let plan_type = self.notes.get("planType").filter(|v| !v.is_empty())?;
        Some((user_id.clone(), plan_type.clone()))
    }
}
