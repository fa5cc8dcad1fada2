// Razorpay error codes.

/// Failures from the gateway layer. Signature failures are terminal
/// (no state mutation); order-creation failures carry gateway detail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RazorpayError {
    #[error("PAYMENT_SIGNATURE_INVALID: Payment signature verification failed")]
    PaymentSignatureInvalid,

    #[error("WEBHOOK_SIGNATURE_INVALID: Webhook signature verification failed")]
    WebhookSignatureInvalid,

    #[error("WEBHOOK_BODY_INVALID: Webhook body could not be parsed: {0}")]
    WebhookBodyInvalid(String),

    #[error("MISSING_CREDENTIALS: Razorpay credentials are not configured")]
    MissingCredentials,

    #[error("ORDER_CREATION_FAILED: {0}")]
    OrderCreationFailed(String),

    #[error("GATEWAY_RESPONSE_INVALID: {0}")]
    GatewayResponseInvalid(String),
}

impl RazorpayError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PaymentSignatureInvalid => "PAYMENT_SIGNATURE_INVALID",
            Self::WebhookSignatureInvalid => "WEBHOOK_SIGNATURE_INVALID",
            Self::WebhookBodyInvalid(_) => "WEBHOOK_BODY_INVALID",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::OrderCreationFailed(_) => "ORDER_CREATION_FAILED",
            Self::GatewayResponseInvalid(_) => "GATEWAY_RESPONSE_INVALID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(RazorpayError::PaymentSignatureInvalid.code(), "PAYMENT_SIGNATURE_INVALID");
        assert_eq!(
            RazorpayError::OrderCreationFailed("boom".into()).code(),
            "ORDER_CREATION_FAILED"
        );
    }

    #[test]
    fn display_carries_detail() {
        let err = RazorpayError::OrderCreationFailed("amount too low".into());
        assert!(err.to_string().contains("amount too low"));
    }
}
