// Data models for every MenuQR entity.
//
// Canonical identifier shape is a string (nanoid) across all entities and
// backends — there is no numeric/string dual handling anywhere downstream.
// Wire format is camelCase JSON with RFC 3339 timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Plan & Subscription Enums ───────────────────────────────────

/// Subscription plan. Pricing and duration live in [`crate::plans`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanType {
    #[serde(rename = "trial")]
    Trial,
    #[serde(rename = "basic-monthly")]
    BasicMonthly,
    #[serde(rename = "pro-monthly")]
    ProMonthly,
    #[serde(rename = "pro-yearly")]
    ProYearly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::BasicMonthly => "basic-monthly",
            Self::ProMonthly => "pro-monthly",
            Self::ProYearly => "pro-yearly",
        }
    }

    /// Parse a plan identifier. Returns `None` for unknown values so each
    /// call site can pick its own fallback policy.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(Self::Trial),
            "basic-monthly" => Some(Self::BasicMonthly),
            "pro-monthly" => Some(Self::ProMonthly),
            "pro-yearly" => Some(Self::ProYearly),
            _ => None,
        }
    }

    /// Pro-tier plans lift the cafe limit and unlock premium themes.
    pub fn is_pro(&self) -> bool {
        matches!(self, Self::ProMonthly | Self::ProYearly)
    }

    /// Plans that can be purchased (everything except the trial).
    pub fn is_purchasable(&self) -> bool {
        !matches!(self, Self::Trial)
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subscription lifecycle state. Transitions are forward-only:
/// trial → active, trial → expired, active → expired, active → active
/// (renewal), expired → active (renewal). Never back to trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One subscription row per user, enforced unique on `user_id`.
/// `end_date` is the sole authority for expiry; status is recomputed
/// lazily against it on every read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan_type: PlanType,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Last successful gateway payment id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Last successful gateway order id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Last paid amount in paise. None while on trial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Cafe Enums ──────────────────────────────────────────────────

/// How a cafe's menu is rendered: structured categories/items, or
/// uploaded menu images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuType {
    Digital,
    Image,
}

impl Default for MenuType {
    fn default() -> Self {
        Self::Digital
    }
}

/// Menu theme. `Modern` and `Premium` require premium access
/// (active pro plan or trial).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Standard,
    Modern,
    Premium,
}

impl Theme {
    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Modern | Self::Premium)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::Standard
    }
}

// ─── Entities ────────────────────────────────────────────────────

/// Cafe owner / admin user. `username` is an email, stored lowercased.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A cafe owned by exactly one user, reachable publicly via its slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cafe {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Globally unique, embedded in the public menu URL and QR code.
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    pub menu_type: MenuType,
    #[serde(default)]
    pub image_menu_urls: Vec<String>,
    pub theme: Theme,
    pub created_at: DateTime<Utc>,
}

/// Menu category within a cafe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub cafe_id: String,
    pub name: String,
    pub sort_order: i32,
    pub is_visible: bool,
}

/// Menu item within a category. Price is in paise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub cafe_id: String,
    pub category_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
    /// Labels like "spicy", "veg", "bestseller".
    #[serde(default)]
    pub badges: Vec<String>,
}

/// Scope of an offer: whole cafe, a set of categories, or a set of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    Flat,
    Category,
    Item,
}

impl Default for OfferType {
    fn default() -> Self {
        Self::Flat
    }
}

/// Percent-based or flat-amount discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percent,
    Flat,
}

impl Default for DiscountType {
    fn default() -> Self {
        Self::Percent
    }
}

/// Promotional offer scoped to a cafe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub cafe_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub offer_type: OfferType,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    #[serde(default)]
    pub applied_categories: Vec<String>,
    #[serde(default)]
    pub applied_items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_visible: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Item tag (dietary, allergen, characteristic). `key` is a unique slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub label: String,
    pub group: String,
    pub key: String,
}

/// Promo code for discounted subscription purchases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    pub id: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<i64>,
    pub current_uses: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
