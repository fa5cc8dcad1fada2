// Menu management: categories and items, plus the public menu read.
//
// Mutations resolve the parent cafe first and run the ownership +
// entitlement checks against it. Public reads skip both and filter to
// visible/available rows.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use menuqr_core::error::{ApiError, ErrorCode, Result};
use menuqr_core::models::{Cafe, Category, MenuItem, Offer, Tag};
use menuqr_core::storage::{
    CategoryUpdate, MenuItemUpdate, NewCategory, NewMenuItem, NewTag, Storage,
};

use crate::cafes::ensure_owned_cafe;
use crate::guard::SubscriptionGuard;

/// Everything a diner sees when they scan the QR code: the cafe, its
/// visible categories with available items, and running offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMenu {
    pub cafe: Cafe,
    pub categories: Vec<PublicCategory>,
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicCategory {
    #[serde(flatten)]
    pub category: Category,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone)]
pub struct MenuService {
    storage: Arc<dyn Storage>,
    guard: SubscriptionGuard,
}

impl MenuService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let guard = SubscriptionGuard::new(storage.clone());
        Self { storage, guard }
    }

    // ─── Categories ──────────────────────────────────────────────

    /// Categories for a cafe the caller owns, in sort order.
    pub async fn categories(&self, user_id: &str, cafe_id: &str) -> Result<Vec<Category>> {
        ensure_owned_cafe(&self.storage, cafe_id, user_id).await?;
        self.storage.get_categories(cafe_id).await
    }

    pub async fn create_category(&self, user_id: &str, category: NewCategory) -> Result<Category> {
        ensure_owned_cafe(&self.storage, &category.cafe_id, user_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        self.storage.create_category(category).await
    }

    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: &str,
        updates: CategoryUpdate,
    ) -> Result<Category> {
        let category = self
            .storage
            .get_category(category_id)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::CategoryNotFound))?;
        ensure_owned_cafe(&self.storage, &category.cafe_id, user_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        self.storage.update_category(category_id, updates).await
    }

    /// Delete a category and its items.
    pub async fn delete_category(&self, user_id: &str, category_id: &str) -> Result<()> {
        let category = self
            .storage
            .get_category(category_id)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::CategoryNotFound))?;
        ensure_owned_cafe(&self.storage, &category.cafe_id, user_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        self.storage.delete_category(category_id).await
    }

    // ─── Menu Items ──────────────────────────────────────────────

    /// Items for a cafe the caller owns, optionally scoped to one
    /// category.
    pub async fn items(
        &self,
        user_id: &str,
        cafe_id: &str,
        category_id: Option<&str>,
    ) -> Result<Vec<MenuItem>> {
        ensure_owned_cafe(&self.storage, cafe_id, user_id).await?;
        self.storage.get_menu_items(cafe_id, category_id).await
    }

    pub async fn create_item(&self, user_id: &str, item: NewMenuItem) -> Result<MenuItem> {
        ensure_owned_cafe(&self.storage, &item.cafe_id, user_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        // The category must exist and belong to the same cafe.
        let category = self
            .storage
            .get_category(&item.category_id)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::CategoryNotFound))?;
        if category.cafe_id != item.cafe_id {
            return Err(ApiError::bad_request(ErrorCode::InvalidInput).into());
        }
        self.storage.create_menu_item(item).await
    }

    pub async fn update_item(
        &self,
        user_id: &str,
        item_id: &str,
        updates: MenuItemUpdate,
    ) -> Result<MenuItem> {
        let item = self
            .storage
            .get_menu_item(item_id)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::MenuItemNotFound))?;
        ensure_owned_cafe(&self.storage, &item.cafe_id, user_id).await?;
        self.guard.require_active_subscription(user_id).await?;

        if let Some(category_id) = updates.category_id.as_deref() {
            let category = self
                .storage
                .get_category(category_id)
                .await?
                .ok_or_else(|| ApiError::not_found(ErrorCode::CategoryNotFound))?;
            if category.cafe_id != item.cafe_id {
                return Err(ApiError::bad_request(ErrorCode::InvalidInput).into());
            }
        }
        self.storage.update_menu_item(item_id, updates).await
    }

    pub async fn delete_item(&self, user_id: &str, item_id: &str) -> Result<()> {
        let item = self
            .storage
            .get_menu_item(item_id)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::MenuItemNotFound))?;
        ensure_owned_cafe(&self.storage, &item.cafe_id, user_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        self.storage.delete_menu_item(item_id).await
    }

    // ─── Tags ────────────────────────────────────────────────────

    /// The global tag catalog (dietary, allergen, characteristic).
    /// Readable without auth; menus reference tags by key in item
    /// badges.
    pub async fn tags(&self) -> Result<Vec<Tag>> {
        self.storage.get_tags().await
    }

    /// Add a tag to the catalog. Tags are not cafe-scoped, so the only
    /// gate is an active subscription.
    pub async fn create_tag(&self, user_id: &str, tag: NewTag) -> Result<Tag> {
        self.guard.require_active_subscription(user_id).await?;
        self.storage.create_tag(tag).await
    }

    // ─── Public Menu ─────────────────────────────────────────────

    /// Assemble the public menu for a slug. Unauthenticated; hidden
    /// categories, unavailable items, and inactive/hidden offers are
    /// filtered out. An expired owner's menu stays readable.
    pub async fn public_menu(&self, slug: &str) -> Result<PublicMenu> {
        let cafe = self
            .storage
            .get_cafe_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::CafeNotFound))?;

        let mut categories = Vec::new();
        for category in self.storage.get_categories(&cafe.id).await? {
            if !category.is_visible {
                continue;
            }
            let items: Vec<MenuItem> = self
                .storage
                .get_menu_items(&cafe.id, Some(&category.id))
                .await?
                .into_iter()
                .filter(|i| i.is_available)
                .collect();
            categories.push(PublicCategory { category, items });
        }

        let now = chrono::Utc::now();
        let offers = self
            .storage
            .get_offers(&cafe.id)
            .await?
            .into_iter()
            .filter(|o| o.is_active && o.is_visible)
            .filter(|o| o.start_at.map_or(true, |s| s <= now))
            .filter(|o| o.end_at.map_or(true, |e| e >= now))
            .collect();

        Ok(PublicMenu {
            cafe,
            categories,
            offers,
        })
    }
}
