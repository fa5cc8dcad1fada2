//! # menuqr-razorpay
//!
//! Razorpay plumbing for MenuQR billing:
//! - `PaymentGateway` trait + reqwest-based orders client
//! - HMAC-SHA256 signature verification for the client-confirmation
//!   callback (`order_id|payment_id`) and for raw webhook bodies
//! - webhook event envelope and `payment.captured` handling helpers

pub mod config;
pub mod error;
pub mod gateway;
pub mod signature;
pub mod webhook;

pub use config::RazorpayOptions;
pub use error::RazorpayError;
pub use gateway::{CreateOrderRequest, GatewayOrder, PaymentGateway, RazorpayClient};
pub use signature::{
    payment_signature, verify_payment_signature, verify_webhook_signature, webhook_signature,
};
pub use webhook::{PaymentEntity, WebhookEvent, WEBHOOK_SIGNATURE_HEADER, EVENT_PAYMENT_CAPTURED};
