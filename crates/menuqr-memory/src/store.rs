// In-memory storage — typed HashMap tables implementing the core
// `Storage` trait.
//
// Thread-safe via `tokio::sync::RwLock`. Uniqueness (username, slug, tag
// key, promo code, one subscription per user) is enforced here the way a
// SQL backend would enforce it with unique indexes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use menuqr_core::error::{MenuQrError, Result};
use menuqr_core::models::*;
use menuqr_core::plans::calculate_end_date;
use menuqr_core::storage::*;
use menuqr_core::utils::generate_id;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    cafes: HashMap<String, Cafe>,
    categories: HashMap<String, Category>,
    menu_items: HashMap<String, MenuItem>,
    offers: HashMap<String, Offer>,
    tags: HashMap<String, Tag>,
    promo_codes: HashMap<String, PromoCode>,
    /// Keyed by user id — the one-subscription-per-user invariant is the
    /// key itself.
    subscriptions: HashMap<String, Subscription>,
}

/// In-memory storage backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all data. Test helper.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }

    /// Row count for a given table. Test helper.
    pub async fn table_count(&self, table: &str) -> usize {
        let t = self.tables.read().await;
        match table {
            "users" => t.users.len(),
            "cafes" => t.cafes.len(),
            "categories" => t.categories.len(),
            "menu_items" => t.menu_items.len(),
            "offers" => t.offers.len(),
            "tags" => t.tags.len(),
            "promo_codes" => t.promo_codes.len(),
            "subscriptions" => t.subscriptions.len(),
            _ => 0,
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let needle = username.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == needle)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.tables.write().await;
        let username = user.username.to_lowercase();
        if t.users.values().any(|u| u.username == username) {
            return Err(MenuQrError::Duplicate(format!("username {username} already exists")));
        }
        let record = User {
            id: generate_id(),
            username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        t.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    // ─── Cafes ───────────────────────────────────────────────────

    async fn get_cafe(&self, id: &str) -> Result<Option<Cafe>> {
        Ok(self.tables.read().await.cafes.get(id).cloned())
    }

    async fn get_cafe_by_slug(&self, slug: &str) -> Result<Option<Cafe>> {
        Ok(self
            .tables
            .read()
            .await
            .cafes
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn get_cafes_by_owner(&self, owner_id: &str) -> Result<Vec<Cafe>> {
        let mut cafes: Vec<Cafe> = self
            .tables
            .read()
            .await
            .cafes
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        cafes.sort_by_key(|c| c.created_at);
        Ok(cafes)
    }

    async fn create_cafe(&self, cafe: NewCafe) -> Result<Cafe> {
        let mut t = self.tables.write().await;
        if t.cafes.values().any(|c| c.slug == cafe.slug) {
            return Err(MenuQrError::Duplicate(format!("slug {} already taken", cafe.slug)));
        }
        let record = Cafe {
            id: generate_id(),
            owner_id: cafe.owner_id,
            name: cafe.name,
            description: cafe.description,
            slug: cafe.slug,
            address: cafe.address,
            logo_url: cafe.logo_url,
            qr_code_url: cafe.qr_code_url,
            menu_type: cafe.menu_type,
            image_menu_urls: cafe.image_menu_urls,
            theme: cafe.theme,
            created_at: Utc::now(),
        };
        t.cafes.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_cafe(&self, id: &str, updates: CafeUpdate) -> Result<Cafe> {
        let mut t = self.tables.write().await;
        let cafe = t
            .cafes
            .get_mut(id)
            .ok_or_else(|| MenuQrError::NotFound(format!("cafe {id}")))?;
        if let Some(name) = updates.name {
            cafe.name = name;
        }
        if let Some(description) = updates.description {
            cafe.description = Some(description);
        }
        if let Some(address) = updates.address {
            cafe.address = Some(address);
        }
        if let Some(logo_url) = updates.logo_url {
            cafe.logo_url = Some(logo_url);
        }
        if let Some(qr_code_url) = updates.qr_code_url {
            cafe.qr_code_url = Some(qr_code_url);
        }
        if let Some(menu_type) = updates.menu_type {
            cafe.menu_type = menu_type;
        }
        if let Some(image_menu_urls) = updates.image_menu_urls {
            cafe.image_menu_urls = image_menu_urls;
        }
        if let Some(theme) = updates.theme {
            cafe.theme = theme;
        }
        Ok(cafe.clone())
    }

    async fn delete_cafe(&self, id: &str) -> Result<()> {
        let mut t = self.tables.write().await;
        t.cafes.remove(id);
        // Cascade owned children.
        t.categories.retain(|_, c| c.cafe_id != id);
        t.menu_items.retain(|_, m| m.cafe_id != id);
        t.offers.retain(|_, o| o.cafe_id != id);
        Ok(())
    }

    // ─── Categories ──────────────────────────────────────────────

    async fn get_category(&self, id: &str) -> Result<Option<Category>> {
        Ok(self.tables.read().await.categories.get(id).cloned())
    }

    async fn get_categories(&self, cafe_id: &str) -> Result<Vec<Category>> {
        let mut cats: Vec<Category> = self
            .tables
            .read()
            .await
            .categories
            .values()
            .filter(|c| c.cafe_id == cafe_id)
            .cloned()
            .collect();
        cats.sort_by_key(|c| c.sort_order);
        Ok(cats)
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let mut t = self.tables.write().await;
        let record = Category {
            id: generate_id(),
            cafe_id: category.cafe_id,
            name: category.name,
            sort_order: category.sort_order,
            is_visible: category.is_visible,
        };
        t.categories.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_category(&self, id: &str, updates: CategoryUpdate) -> Result<Category> {
        let mut t = self.tables.write().await;
        let cat = t
            .categories
            .get_mut(id)
            .ok_or_else(|| MenuQrError::NotFound(format!("category {id}")))?;
        if let Some(name) = updates.name {
            cat.name = name;
        }
        if let Some(sort_order) = updates.sort_order {
            cat.sort_order = sort_order;
        }
        if let Some(is_visible) = updates.is_visible {
            cat.is_visible = is_visible;
        }
        Ok(cat.clone())
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        let mut t = self.tables.write().await;
        t.categories.remove(id);
        t.menu_items.retain(|_, m| m.category_id != id);
        Ok(())
    }

    // ─── Menu Items ──────────────────────────────────────────────

    async fn get_menu_item(&self, id: &str) -> Result<Option<MenuItem>> {
        Ok(self.tables.read().await.menu_items.get(id).cloned())
    }

    async fn get_menu_items(
        &self,
        cafe_id: &str,
        category_id: Option<&str>,
    ) -> Result<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self
            .tables
            .read()
            .await
            .menu_items
            .values()
            .filter(|m| m.cafe_id == cafe_id)
            .filter(|m| category_id.map_or(true, |c| m.category_id == c))
            .cloned()
            .collect();
        items.sort_by_key(|m| m.sort_order);
        Ok(items)
    }

    async fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem> {
        let mut t = self.tables.write().await;
        let record = MenuItem {
            id: generate_id(),
            cafe_id: item.cafe_id,
            category_id: item.category_id,
            name: item.name,
            description: item.description,
            price: item.price,
            image_url: item.image_url,
            is_available: item.is_available,
            sort_order: item.sort_order,
            badges: item.badges,
        };
        t.menu_items.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_menu_item(&self, id: &str, updates: MenuItemUpdate) -> Result<MenuItem> {
        let mut t = self.tables.write().await;
        let item = t
            .menu_items
            .get_mut(id)
            .ok_or_else(|| MenuQrError::NotFound(format!("menu item {id}")))?;
        if let Some(category_id) = updates.category_id {
            item.category_id = category_id;
        }
        if let Some(name) = updates.name {
            item.name = name;
        }
        if let Some(description) = updates.description {
            item.description = Some(description);
        }
        if let Some(price) = updates.price {
            item.price = price;
        }
        if let Some(image_url) = updates.image_url {
            item.image_url = Some(image_url);
        }
        if let Some(is_available) = updates.is_available {
            item.is_available = is_available;
        }
        if let Some(sort_order) = updates.sort_order {
            item.sort_order = sort_order;
        }
        if let Some(badges) = updates.badges {
            item.badges = badges;
        }
        Ok(item.clone())
    }

    async fn delete_menu_item(&self, id: &str) -> Result<()> {
        self.tables.write().await.menu_items.remove(id);
        Ok(())
    }

    // ─── Offers ──────────────────────────────────────────────────

    async fn get_offer(&self, id: &str) -> Result<Option<Offer>> {
        Ok(self.tables.read().await.offers.get(id).cloned())
    }

    async fn get_offers(&self, cafe_id: &str) -> Result<Vec<Offer>> {
        let mut offers: Vec<Offer> = self
            .tables
            .read()
            .await
            .offers
            .values()
            .filter(|o| o.cafe_id == cafe_id)
            .cloned()
            .collect();
        offers.sort_by_key(|o| o.created_at);
        Ok(offers)
    }

    async fn create_offer(&self, offer: NewOffer) -> Result<Offer> {
        let mut t = self.tables.write().await;
        let record = Offer {
            id: generate_id(),
            cafe_id: offer.cafe_id,
            title: offer.title,
            description: offer.description,
            image_url: offer.image_url,
            offer_type: offer.offer_type,
            discount_type: offer.discount_type,
            discount_value: offer.discount_value,
            applied_categories: offer.applied_categories,
            applied_items: offer.applied_items,
            start_at: offer.start_at,
            end_at: offer.end_at,
            is_active: offer.is_active,
            is_visible: offer.is_visible,
            is_featured: offer.is_featured,
            created_at: Utc::now(),
        };
        t.offers.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_offer(&self, id: &str, updates: OfferUpdate) -> Result<Offer> {
        let mut t = self.tables.write().await;
        let offer = t
            .offers
            .get_mut(id)
            .ok_or_else(|| MenuQrError::NotFound(format!("offer {id}")))?;
        if let Some(title) = updates.title {
            offer.title = title;
        }
        if let Some(description) = updates.description {
            offer.description = Some(description);
        }
        if let Some(image_url) = updates.image_url {
            offer.image_url = Some(image_url);
        }
        if let Some(offer_type) = updates.offer_type {
            offer.offer_type = offer_type;
        }
        if let Some(discount_type) = updates.discount_type {
            offer.discount_type = discount_type;
        }
        if let Some(discount_value) = updates.discount_value {
            offer.discount_value = discount_value;
        }
        if let Some(applied_categories) = updates.applied_categories {
            offer.applied_categories = applied_categories;
        }
        if let Some(applied_items) = updates.applied_items {
            offer.applied_items = applied_items;
        }
        if let Some(start_at) = updates.start_at {
            offer.start_at = Some(start_at);
        }
        if let Some(end_at) = updates.end_at {
            offer.end_at = Some(end_at);
        }
        if let Some(is_active) = updates.is_active {
            offer.is_active = is_active;
        }
        if let Some(is_visible) = updates.is_visible {
            offer.is_visible = is_visible;
        }
        if let Some(is_featured) = updates.is_featured {
            offer.is_featured = is_featured;
        }
        Ok(offer.clone())
    }

    async fn delete_offer(&self, id: &str) -> Result<()> {
        self.tables.write().await.offers.remove(id);
        Ok(())
    }

    // ─── Tags ────────────────────────────────────────────────────

    async fn get_tags(&self) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.tables.read().await.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(tags)
    }

    async fn create_tag(&self, tag: NewTag) -> Result<Tag> {
        let mut t = self.tables.write().await;
        if t.tags.values().any(|existing| existing.key == tag.key) {
            return Err(MenuQrError::Duplicate(format!("tag key {} already exists", tag.key)));
        }
        let record = Tag {
            id: generate_id(),
            label: tag.label,
            group: tag.group,
            key: tag.key,
        };
        t.tags.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    // ─── Promo Codes ─────────────────────────────────────────────

    async fn get_promo_code(&self, code: &str) -> Result<Option<PromoCode>> {
        Ok(self
            .tables
            .read()
            .await
            .promo_codes
            .values()
            .find(|p| p.code == code)
            .cloned())
    }

    async fn create_promo_code(&self, promo: NewPromoCode) -> Result<PromoCode> {
        let mut t = self.tables.write().await;
        if t.promo_codes.values().any(|p| p.code == promo.code) {
            return Err(MenuQrError::Duplicate(format!("promo code {} already exists", promo.code)));
        }
        let record = PromoCode {
            id: generate_id(),
            code: promo.code,
            discount_type: promo.discount_type,
            value: promo.value,
            max_uses: promo.max_uses,
            current_uses: 0,
            expires_at: promo.expires_at,
            created_at: Utc::now(),
        };
        t.promo_codes.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_promo_code(&self, id: &str, updates: PromoCodeUpdate) -> Result<PromoCode> {
        let mut t = self.tables.write().await;
        let promo = t
            .promo_codes
            .get_mut(id)
            .ok_or_else(|| MenuQrError::NotFound(format!("promo code {id}")))?;
        if let Some(max_uses) = updates.max_uses {
            promo.max_uses = Some(max_uses);
        }
        if let Some(current_uses) = updates.current_uses {
            promo.current_uses = current_uses;
        }
        if let Some(expires_at) = updates.expires_at {
            promo.expires_at = Some(expires_at);
        }
        Ok(promo.clone())
    }

    // ─── Subscriptions ───────────────────────────────────────────

    async fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
        Ok(self.tables.read().await.subscriptions.get(user_id).cloned())
    }

    async fn create_subscription(&self, user_id: &str) -> Result<Subscription> {
        let mut t = self.tables.write().await;
        if t.subscriptions.contains_key(user_id) {
            return Err(MenuQrError::Duplicate(format!(
                "subscription for user {user_id} already exists"
            )));
        }
        let now = Utc::now();
        let record = Subscription {
            id: generate_id(),
            user_id: user_id.to_string(),
            plan_type: PlanType::Trial,
            status: SubscriptionStatus::Trial,
            start_date: now,
            end_date: calculate_end_date(PlanType::Trial, now),
            payment_id: None,
            order_id: None,
            amount: None,
            created_at: now,
            updated_at: now,
        };
        t.subscriptions.insert(user_id.to_string(), record.clone());
        Ok(record)
    }

    async fn update_subscription(
        &self,
        user_id: &str,
        updates: SubscriptionUpdate,
    ) -> Result<Subscription> {
        let mut t = self.tables.write().await;
        let sub = t
            .subscriptions
            .get_mut(user_id)
            .ok_or_else(|| MenuQrError::NotFound(format!("subscription for user {user_id}")))?;
        if let Some(plan_type) = updates.plan_type {
            sub.plan_type = plan_type;
        }
        if let Some(status) = updates.status {
            sub.status = status;
        }
        if let Some(start_date) = updates.start_date {
            sub.start_date = start_date;
        }
        if let Some(end_date) = updates.end_date {
            sub.end_date = end_date;
        }
        if let Some(payment_id) = updates.payment_id {
            sub.payment_id = Some(payment_id);
        }
        if let Some(order_id) = updates.order_id {
            sub.order_id = Some(order_id);
        }
        if let Some(amount) = updates.amount {
            sub.amount = Some(amount);
        }
        sub.updated_at = updates.updated_at.unwrap_or_else(Utc::now);
        Ok(sub.clone())
    }
}
