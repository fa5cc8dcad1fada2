// Billing flows: order creation, client-callback verification, webhook
// processing, and the status endpoint.
//
// Two independent confirmation channels can activate the same payment;
// activation is idempotent (write the same absolute state twice) so the
// order they land in does not matter.
//
// Webhook rule: signature failures are rejected with an error so the
// gateway retries; every application-level failure after that point is
// logged and swallowed — returning an error for those would only make
// the gateway re-deliver an event we already know we cannot use.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use menuqr_core::error::{ApiError, ErrorCode, MenuQrError, Result};
use menuqr_core::logger::MenuLogger;
use menuqr_core::models::{PlanType, Subscription, SubscriptionStatus};
use menuqr_core::plans::{calculate_end_date, days_remaining, plan_amount};
use menuqr_core::storage::{Storage, SubscriptionUpdate};
use menuqr_razorpay::{
    verify_payment_signature, verify_webhook_signature, CreateOrderRequest, PaymentGateway,
    RazorpayOptions, WebhookEvent,
};

use crate::guard::SubscriptionGuard;

/// Response for a created order; everything the checkout client needs to
/// open the payment widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Amount in paise, from the server-side pricing table.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

/// Client callback payload posted after the checkout widget completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub plan_type: String,
}

/// Subscription status snapshot for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusResponse {
    pub has_subscription: bool,
    pub status: SubscriptionStatus,
    pub plan_type: PlanType,
    pub start_date: chrono::DateTime<Utc>,
    pub end_date: chrono::DateTime<Utc>,
    pub days_remaining: i64,
    /// False once expired; gates the admin UI.
    pub can_perform_actions: bool,
    /// True for expired and trial users; active paid plans are locked
    /// until their window closes.
    pub can_change_plan: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

/// Orchestrates the payment gateway, the guard, and subscription
/// persistence.
#[derive(Debug, Clone)]
pub struct BillingService {
    storage: Arc<dyn Storage>,
    guard: SubscriptionGuard,
    gateway: Option<Arc<dyn PaymentGateway>>,
    options: Option<RazorpayOptions>,
    logger: MenuLogger,
}

impl BillingService {
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        options: Option<RazorpayOptions>,
        logger: MenuLogger,
    ) -> Self {
        let guard = SubscriptionGuard::new(storage.clone());
        Self {
            storage,
            guard,
            gateway,
            options,
            logger,
        }
    }

    /// Create a gateway order for a plan purchase.
    ///
    /// The amount always comes from the server-side pricing table; the
    /// client only names the plan. Mid-cycle purchases are refused
    /// before the gateway is touched.
    pub async fn create_order(&self, user_id: &str, plan_str: &str) -> Result<CreateOrderResponse> {
        let plan = PlanType::parse(plan_str)
            .filter(|p| p.is_purchasable())
            .ok_or_else(|| MenuQrError::from(ApiError::bad_request(ErrorCode::InvalidPlanType)))?;

        let decision = self.guard.can_purchase_plan(user_id, plan).await?;
        if !decision.allowed {
            return Err(ApiError::forbidden_reason(
                ErrorCode::MidCyclePlanChange,
                decision
                    .reason
                    .unwrap_or_else(|| ErrorCode::MidCyclePlanChange.to_string()),
            )
            .into());
        }

        let amount = plan_amount(plan);
        if amount <= 0 {
            return Err(ApiError::bad_request(ErrorCode::InvalidPlanAmount).into());
        }

        let (gateway, options) = match (&self.gateway, &self.options) {
            (Some(g), Some(o)) => (g, o),
            _ => {
                return Err(
                    ApiError::service_unavailable(ErrorCode::PaymentGatewayNotConfigured).into(),
                )
            }
        };

        let mut notes = HashMap::new();
        notes.insert("userId".to_string(), user_id.to_string());
        notes.insert("planType".to_string(), plan.as_str().to_string());

        let order = gateway
            .create_order(CreateOrderRequest {
                amount,
                currency: "INR".to_string(),
                receipt: format!("rcpt_{}_{}", user_id, Utc::now().timestamp_millis()),
                notes,
            })
            .await
            .map_err(|e| {
                self.logger.error(&format!("order creation failed: {e}"));
                MenuQrError::Gateway(e.to_string())
            })?;

        self.logger.info(&format!(
            "created order {} for user {user_id} plan {plan}",
            order.id
        ));

        Ok(CreateOrderResponse {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: options.key_id.clone(),
        })
    }

    /// Verify the client checkout callback and activate the plan.
    ///
    /// Nothing is written unless the HMAC over `"{order_id}|{payment_id}"`
    /// checks out. An unknown or non-purchasable plan string falls back
    /// to basic-monthly rather than stranding a captured payment.
    pub async fn verify_payment(
        &self,
        user_id: &str,
        request: &VerifyPaymentRequest,
    ) -> Result<Subscription> {
        let options = self.options.as_ref().ok_or_else(|| {
            MenuQrError::from(ApiError::service_unavailable(
                ErrorCode::PaymentGatewayNotConfigured,
            ))
        })?;

        verify_payment_signature(
            &request.razorpay_order_id,
            &request.razorpay_payment_id,
            &request.razorpay_signature,
            &options.key_secret,
        )
        .map_err(|_| {
            self.logger
                .warn(&format!("payment signature mismatch for user {user_id}"));
            MenuQrError::from(ApiError::bad_request(ErrorCode::InvalidPaymentSignature))
        })?;

        let plan = PlanType::parse(&request.plan_type)
            .filter(|p| p.is_purchasable())
            .unwrap_or(PlanType::BasicMonthly);

        let sub = self
            .activate(
                user_id,
                plan,
                plan_amount(plan),
                &request.razorpay_payment_id,
                &request.razorpay_order_id,
            )
            .await?;

        self.logger.success(&format!(
            "payment {} verified, user {user_id} now on {plan}",
            request.razorpay_payment_id
        ));
        Ok(sub)
    }

    /// Process a raw webhook delivery.
    ///
    /// The signature covers the raw body and is checked before parsing.
    /// After the signature passes, every failure is a logged no-op so the
    /// gateway does not keep retrying an event we cannot use.
    pub async fn handle_webhook(&self, raw_body: &[u8], signature: &str) -> Result<()> {
        let options = self
            .options
            .as_ref()
            .filter(|o| o.has_webhook_secret())
            .ok_or_else(|| MenuQrError::Config("webhook secret not configured".to_string()))?;

        verify_webhook_signature(raw_body, signature, &options.webhook_secret).map_err(|_| {
            self.logger.warn("webhook signature mismatch");
            MenuQrError::from(ApiError::bad_request(ErrorCode::InvalidWebhookSignature))
        })?;

        let event = match WebhookEvent::parse(raw_body) {
            Ok(event) => event,
            Err(e) => {
                self.logger.warn(&format!("unparseable webhook body: {e}"));
                return Ok(());
            }
        };

        if !event.is_payment_captured() {
            self.logger
                .debug(&format!("ignoring webhook event {}", event.event));
            return Ok(());
        }

        let Some(payment) = event.payment() else {
            self.logger.warn("payment.captured event without payment entity");
            return Ok(());
        };

        let Some((user_id, plan_str)) = payment.correlation() else {
            self.logger.warn(&format!(
                "payment {} has no usable correlation notes",
                payment.id
            ));
            return Ok(());
        };

        let plan = PlanType::parse(&plan_str)
            .filter(|p| p.is_purchasable())
            .unwrap_or(PlanType::BasicMonthly);

        // The gateway-reported captured amount is recorded, not the table
        // price, so discrepancies stay visible.
        match self
            .activate(&user_id, plan, payment.amount, &payment.id, &payment.order_id)
            .await
        {
            Ok(_) => {
                self.logger.success(&format!(
                    "webhook activated {plan} for user {user_id} (payment {})",
                    payment.id
                ));
            }
            Err(e) => {
                self.logger
                    .error(&format!("webhook activation failed for user {user_id}: {e}"));
            }
        }
        Ok(())
    }

    /// Dashboard status read. Missing subscriptions are created on the
    /// spot (7-day trial), which is how the trial starts for new users.
    pub async fn status(&self, user_id: &str) -> Result<SubscriptionStatusResponse> {
        if self.storage.get_subscription(user_id).await?.is_none() {
            // Tolerate a concurrent creation racing us.
            match self.storage.create_subscription(user_id).await {
                Ok(_) => {}
                Err(MenuQrError::Duplicate(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let sub = self
            .guard
            .resolve(user_id)
            .await?
            .ok_or_else(|| MenuQrError::Storage("subscription vanished after create".to_string()))?;

        let now = Utc::now();
        Ok(SubscriptionStatusResponse {
            has_subscription: true,
            status: sub.status,
            plan_type: sub.plan_type,
            start_date: sub.start_date,
            end_date: sub.end_date,
            days_remaining: days_remaining(sub.end_date, now),
            can_perform_actions: sub.status != SubscriptionStatus::Expired,
            can_change_plan: matches!(
                sub.status,
                SubscriptionStatus::Expired | SubscriptionStatus::Trial
            ),
            amount: sub.amount,
        })
    }

    /// Write the absolute post-payment state. Ensures a row exists first
    /// so webhook-before-first-login still lands, and writes the same
    /// values on every delivery of the same payment.
    async fn activate(
        &self,
        user_id: &str,
        plan: PlanType,
        amount: i64,
        payment_id: &str,
        order_id: &str,
    ) -> Result<Subscription> {
        if self.storage.get_subscription(user_id).await?.is_none() {
            match self.storage.create_subscription(user_id).await {
                Ok(_) => {}
                Err(MenuQrError::Duplicate(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let now = Utc::now();
        self.storage
            .update_subscription(
                user_id,
                SubscriptionUpdate {
                    plan_type: Some(plan),
                    status: Some(SubscriptionStatus::Active),
                    start_date: Some(now),
                    end_date: Some(calculate_end_date(plan, now)),
                    payment_id: Some(payment_id.to_string()),
                    order_id: Some(order_id.to_string()),
                    amount: Some(amount),
                    updated_at: Some(now),
                },
            )
            .await
    }
}
