// Razorpay signature verification.
//
// Two independent confirmation channels, two HMAC payloads:
// - client callback: HMAC-SHA256(key_secret, "{order_id}|{payment_id}")
// - webhook: HMAC-SHA256(webhook_secret, raw request body)
// Both compare hex digests in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::RazorpayError;

type HmacSha256 = Hmac<Sha256>;

fn hmac_hex(secret: &str, payload: &[u8]) -> Result<String, RazorpayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| RazorpayError::MissingCredentials)?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    subtle::ConstantTimeEq::ct_eq(a.as_bytes(), b.as_bytes()).into()
}

/// Compute the expected client-callback signature for an order/payment
/// pair. Exposed for tests and tooling.
pub fn payment_signature(order_id: &str, payment_id: &str, key_secret: &str) -> String {
    // new_from_slice only fails on an empty-ish key type, which String
    // slices never hit; fall back to an empty digest rather than panic.
    hmac_hex(key_secret, format!("{order_id}|{payment_id}").as_bytes()).unwrap_or_default()
}

/// Compute the expected webhook signature for a raw body. Exposed for
/// tests and tooling.
pub fn webhook_signature(payload: &[u8], webhook_secret: &str) -> String {
    hmac_hex(webhook_secret, payload).unwrap_or_default()
}

/// Verify the signature posted by the checkout client after payment.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> Result<(), RazorpayError> {
    let expected = hmac_hex(key_secret, format!("{order_id}|{payment_id}").as_bytes())?;
    if constant_time_eq(&expected, signature) {
        Ok(())
    } else {
        Err(RazorpayError::PaymentSignatureInvalid)
    }
}

/// Verify the `X-Razorpay-Signature` header against the raw webhook body.
/// Must run before the body is parsed.
pub fn verify_webhook_signature(
    payload: &[u8],
    signature: &str,
    webhook_secret: &str,
) -> Result<(), RazorpayError> {
    if webhook_secret.is_empty() {
        return Err(RazorpayError::MissingCredentials);
    }
    let expected = hmac_hex(webhook_secret, payload)?;
    if constant_time_eq(&expected, signature) {
        Ok(())
    } else {
        Err(RazorpayError::WebhookSignatureInvalid)
    }
}
