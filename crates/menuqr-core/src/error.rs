// Error taxonomy for the MenuQR backend.
//
// Three layers:
// - `ErrorCode`: every user-visible failure condition, with a stable
//   SCREAMING_SNAKE_CASE wire code and a human-readable message.
// - `ApiError`: an HTTP-shaped error (status + code + message) that the
//   HTTP layer renders as JSON.
// - `MenuQrError`: the internal error enum for everything else
//   (configuration, storage, gateway failures).
//
// Entitlement denials are deliberately NOT part of this taxonomy at the
// guard level — the guard returns a decision value and callers convert a
// denial into `ApiError::forbidden_reason` only at the service boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NoSubscriptionFound,
    SubscriptionExpired,
    SubscriptionNotFound,
    PlanLimitReached,
    MidCyclePlanChange,
    InvalidPlanType,
    InvalidPlanAmount,
    PremiumThemeRequiresPro,
    InvalidPaymentSignature,
    InvalidWebhookSignature,
    PaymentGatewayError,
    PaymentGatewayNotConfigured,
    UserNotFound,
    UserAlreadyExists,
    CafeNotFound,
    CategoryNotFound,
    MenuItemNotFound,
    OfferNotFound,
    TagAlreadyExists,
    PromoCodeNotFound,
    SlugAlreadyTaken,
    CouldNotParseBody,
    InvalidInput,
    InternalServerError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NoSubscriptionFound => "No subscription found. Please contact support.",
            Self::SubscriptionExpired => "Subscription expired. Please renew to continue.",
            Self::SubscriptionNotFound => "Subscription not found",
            Self::PlanLimitReached => "Plan limit reached",
            Self::MidCyclePlanChange => "You cannot change plans mid-cycle.",
            Self::InvalidPlanType => "Invalid plan type",
            Self::InvalidPlanAmount => "Invalid plan amount",
            Self::PremiumThemeRequiresPro => {
                "Premium themes are only available on the Pro plan or during Trial."
            }
            Self::InvalidPaymentSignature => "Invalid payment signature",
            Self::InvalidWebhookSignature => "Invalid webhook signature",
            Self::PaymentGatewayError => "Payment gateway error",
            Self::PaymentGatewayNotConfigured => "Payment gateway configuration missing",
            Self::UserNotFound => "User not found",
            Self::UserAlreadyExists => "User already exists",
            Self::CafeNotFound => "Cafe not found",
            Self::CategoryNotFound => "Category not found",
            Self::MenuItemNotFound => "Menu item not found",
            Self::OfferNotFound => "Offer not found",
            Self::TagAlreadyExists => "Tag already exists",
            Self::PromoCodeNotFound => "Promo code not found",
            Self::SlugAlreadyTaken => "Slug already taken",
            Self::CouldNotParseBody => "Could not parse body",
            Self::InvalidInput => "Invalid input",
            Self::InternalServerError => "Internal server error",
        };
        write!(f, "{msg}")
    }
}

/// HTTP status codes used by the API error system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatus {
    Ok = 200,
    Created = 201,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    Conflict = 409,
    UnprocessableEntity = 422,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl HttpStatus {
    pub fn status_code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// HTTP-shaped error carrying a status, a stable code, and a message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status} {code:?}: {message}")]
pub struct ApiError {
    pub status: HttpStatus,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: HttpStatus, code: ErrorCode) -> Self {
        Self {
            message: code.to_string(),
            status,
            code,
        }
    }

    pub fn with_message(status: HttpStatus, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(HttpStatus::BadRequest, code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Unauthorized, code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Forbidden, code)
    }

    /// 403 carrying a guard decision's human-readable reason.
    pub fn forbidden_reason(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self::with_message(HttpStatus::Forbidden, code, reason)
    }

    pub fn not_found(code: ErrorCode) -> Self {
        Self::new(HttpStatus::NotFound, code)
    }

    pub fn conflict(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Conflict, code)
    }

    pub fn internal(code: ErrorCode) -> Self {
        Self::new(HttpStatus::InternalServerError, code)
    }

    pub fn service_unavailable(code: ErrorCode) -> Self {
        Self::new(HttpStatus::ServiceUnavailable, code)
    }

    /// JSON body for the error response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
        })
    }
}

/// Internal (non-HTTP) error for configuration, storage, and gateway
/// failures.
#[derive(Debug, thiserror::Error)]
pub enum MenuQrError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Unified result type for MenuQR operations.
pub type Result<T> = std::result::Result<T, MenuQrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_messages_are_actionable() {
        // The guard surfaces these verbatim, so the wording matters.
        assert_eq!(
            ErrorCode::SubscriptionExpired.to_string(),
            "Subscription expired. Please renew to continue."
        );
        assert!(ErrorCode::NoSubscriptionFound.to_string().contains("No subscription found"));
        assert!(ErrorCode::PremiumThemeRequiresPro
            .to_string()
            .contains("Pro plan or during Trial"));
    }

    #[test]
    fn api_error_json_shape() {
        let err = ApiError::forbidden(ErrorCode::SubscriptionExpired);
        let json = err.to_json();
        assert_eq!(json["code"], "SUBSCRIPTION_EXPIRED");
        assert_eq!(json["message"], "Subscription expired. Please renew to continue.");
    }

    #[test]
    fn status_codes() {
        assert_eq!(HttpStatus::Forbidden.status_code(), 403);
        assert_eq!(HttpStatus::ServiceUnavailable.status_code(), 503);
    }

    #[test]
    fn forbidden_reason_overrides_message() {
        let err = ApiError::forbidden_reason(ErrorCode::PlanLimitReached, "limit of 2 cafes");
        assert_eq!(err.status, HttpStatus::Forbidden);
        assert_eq!(err.message, "limit of 2 cafes");
    }
}
