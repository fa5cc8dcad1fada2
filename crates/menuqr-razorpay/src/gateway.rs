// Payment gateway client.
//
// `PaymentGateway` is the trait seam the billing service depends on;
// `RazorpayClient` is the production implementation — one authenticated
// POST to the Razorpay orders API. No retries: a gateway failure is a
// hard error for the request that triggered it.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RazorpayOptions;
use crate::error::RazorpayError;

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

/// Order creation request. `notes` is opaque metadata echoed back on
/// webhook events — billing uses it to correlate payments to users.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

/// The subset of the gateway's order object the billing layer needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Gateway seam. Implemented by `RazorpayClient` in production and by
/// in-memory fakes in tests.
#[async_trait]
pub trait PaymentGateway: Send + Sync + fmt::Debug {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, RazorpayError>;
}

/// Production Razorpay client.
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    options: RazorpayOptions,
}

impl RazorpayClient {
    pub fn new(options: RazorpayOptions) -> Self {
        Self {
            http: reqwest::Client::new(),
            options,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, RazorpayError> {
        let response = self
            .http
            .post(ORDERS_URL)
            .basic_auth(&self.options.key_id, Some(&self.options.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| RazorpayError::OrderCreationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RazorpayError::OrderCreationFailed(format!(
                "gateway returned {status}: {detail}"
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| RazorpayError::GatewayResponseInvalid(e.to_string()))
    }
}
