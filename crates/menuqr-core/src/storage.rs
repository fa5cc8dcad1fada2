// The persistence seam — typed per-entity CRUD operations.
//
// Every backend implements this trait; the service layer takes an
// `Arc<dyn Storage>` chosen once at process start. There is no runtime
// backend switching and no untyped payloads crossing this boundary.
//
// `update_subscription` assumes the row exists and fails with
// `MenuQrError::NotFound` otherwise — callers needing idempotent creation
// call `create_subscription` first.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{
    Cafe, Category, DiscountType, MenuItem, MenuType, Offer, OfferType, PlanType, PromoCode,
    Subscription, SubscriptionStatus, Tag, Theme, User,
};

// ─── Insert Payloads ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCafe {
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub menu_type: MenuType,
    #[serde(default)]
    pub image_menu_urls: Vec<String>,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub cafe_id: String,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub cafe_id: String,
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffer {
    pub cafe_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub offer_type: OfferType,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: i64,
    #[serde(default)]
    pub applied_categories: Vec<String>,
    #[serde(default)]
    pub applied_items: Vec<String>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTag {
    pub label: String,
    pub group: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPromoCode {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
    #[serde(default)]
    pub max_uses: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

// ─── Update Payloads ─────────────────────────────────────────────

/// Partial cafe update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub menu_type: Option<MenuType>,
    pub image_menu_urls: Option<Vec<String>>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
    pub badges: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub offer_type: Option<OfferType>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub applied_categories: Option<Vec<String>>,
    pub applied_items: Option<Vec<String>>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub is_visible: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Partial subscription update applied by the guard (lazy expiry) and the
/// billing layer (activation). Last-writer-wins: re-applying an identical
/// update is harmless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    pub plan_type: Option<PlanType>,
    pub status: Option<SubscriptionStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub amount: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeUpdate {
    pub max_uses: Option<i64>,
    pub current_uses: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

// ─── Storage Trait ───────────────────────────────────────────────

/// The persistence interface. One backend instance is injected at
/// process start and shared behind an `Arc`.
#[async_trait]
pub trait Storage: Send + Sync + fmt::Debug {
    // ─── Users ───────────────────────────────────────────────────
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn create_user(&self, user: NewUser) -> Result<User>;

    // ─── Cafes ───────────────────────────────────────────────────
    async fn get_cafe(&self, id: &str) -> Result<Option<Cafe>>;
    async fn get_cafe_by_slug(&self, slug: &str) -> Result<Option<Cafe>>;
    async fn get_cafes_by_owner(&self, owner_id: &str) -> Result<Vec<Cafe>>;
    async fn create_cafe(&self, cafe: NewCafe) -> Result<Cafe>;
    async fn update_cafe(&self, id: &str, updates: CafeUpdate) -> Result<Cafe>;
    async fn delete_cafe(&self, id: &str) -> Result<()>;

    // ─── Categories ──────────────────────────────────────────────
    async fn get_category(&self, id: &str) -> Result<Option<Category>>;
    async fn get_categories(&self, cafe_id: &str) -> Result<Vec<Category>>;
    async fn create_category(&self, category: NewCategory) -> Result<Category>;
    async fn update_category(&self, id: &str, updates: CategoryUpdate) -> Result<Category>;
    async fn delete_category(&self, id: &str) -> Result<()>;

    // ─── Menu Items ──────────────────────────────────────────────
    async fn get_menu_item(&self, id: &str) -> Result<Option<MenuItem>>;
    async fn get_menu_items(&self, cafe_id: &str, category_id: Option<&str>)
        -> Result<Vec<MenuItem>>;
    async fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem>;
    async fn update_menu_item(&self, id: &str, updates: MenuItemUpdate) -> Result<MenuItem>;
    async fn delete_menu_item(&self, id: &str) -> Result<()>;

    // ─── Offers ──────────────────────────────────────────────────
    async fn get_offer(&self, id: &str) -> Result<Option<Offer>>;
    async fn get_offers(&self, cafe_id: &str) -> Result<Vec<Offer>>;
    async fn create_offer(&self, offer: NewOffer) -> Result<Offer>;
    async fn update_offer(&self, id: &str, updates: OfferUpdate) -> Result<Offer>;
    async fn delete_offer(&self, id: &str) -> Result<()>;

    // ─── Tags ────────────────────────────────────────────────────
    async fn get_tags(&self) -> Result<Vec<Tag>>;
    async fn create_tag(&self, tag: NewTag) -> Result<Tag>;

    // ─── Promo Codes ─────────────────────────────────────────────
    async fn get_promo_code(&self, code: &str) -> Result<Option<PromoCode>>;
    async fn create_promo_code(&self, promo: NewPromoCode) -> Result<PromoCode>;
    async fn update_promo_code(&self, id: &str, updates: PromoCodeUpdate) -> Result<PromoCode>;

    // ─── Subscriptions ───────────────────────────────────────────
    /// Fetch the single subscription row for a user, if any.
    async fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>>;

    /// Create the user's subscription, seeded as a 7-day trial.
    /// Fails with `Duplicate` if the user already has one.
    async fn create_subscription(&self, user_id: &str) -> Result<Subscription>;

    /// Apply a partial update keyed by user id. Fails with `NotFound`
    /// if no subscription row exists.
    async fn update_subscription(
        &self,
        user_id: &str,
        updates: SubscriptionUpdate,
    ) -> Result<Subscription>;
}
