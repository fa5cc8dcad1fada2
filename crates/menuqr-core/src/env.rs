// Environment detection and credential lookup.
//
// The payment-gateway secrets are read lazily per request path so a
// deployment without billing configured still serves menus; the billing
// endpoints short-circuit with a configuration error instead.

use std::sync::OnceLock;

/// Cached environment mode.
static ENV_MODE: OnceLock<EnvMode> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
    Test,
}

/// Detect the current environment mode.
/// Checks `MENUQR_ENV` then `RUST_ENV`.
pub fn detect_env_mode() -> EnvMode {
    *ENV_MODE.get_or_init(|| {
        let env_val = std::env::var("MENUQR_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default()
            .to_lowercase();

        match env_val.as_str() {
            "production" | "prod" => EnvMode::Production,
            "test" | "testing" => EnvMode::Test,
            _ => EnvMode::Development,
        }
    })
}

pub fn is_production() -> bool {
    detect_env_mode() == EnvMode::Production
}

pub fn is_test() -> bool {
    detect_env_mode() == EnvMode::Test
}

/// Razorpay key id (public, shared with the checkout client).
pub fn razorpay_key_id() -> Option<String> {
    std::env::var("RAZORPAY_KEY_ID").ok().filter(|v| !v.is_empty())
}

/// Razorpay key secret, used for order creation auth and client-callback
/// signature verification.
pub fn razorpay_key_secret() -> Option<String> {
    std::env::var("RAZORPAY_KEY_SECRET").ok().filter(|v| !v.is_empty())
}

/// Razorpay webhook signing secret.
pub fn razorpay_webhook_secret() -> Option<String> {
    std::env::var("RAZORPAY_WEBHOOK_SECRET").ok().filter(|v| !v.is_empty())
}

/// Public base URL used to build menu links embedded in QR codes.
pub fn public_base_url() -> String {
    std::env::var("MENUQR_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
