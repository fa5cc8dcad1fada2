// Cafe management: creation (limit-gated), updates (ownership +
// entitlement + theme gating), deletion, and public lookup by slug.
//
// Every mutation runs two checks in order: the caller owns the cafe,
// then the caller's subscription allows admin actions. Premium themes
// add a third check on top.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use menuqr_core::error::{ApiError, ErrorCode, Result};
use menuqr_core::logger::MenuLogger;
use menuqr_core::models::{Cafe, MenuType, Subscription, Theme};
use menuqr_core::storage::{CafeUpdate, NewCafe, Storage};
use menuqr_core::utils::slug::slugify;

use crate::guard::{has_premium_access, GuardDecision, SubscriptionGuard};
use crate::qr::{menu_url, qr_svg_data_url};

/// Cafe creation payload from the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCafeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub menu_type: MenuType,
    #[serde(default)]
    pub image_menu_urls: Vec<String>,
    #[serde(default)]
    pub theme: Theme,
}

/// Fetch a cafe and check it belongs to `user_id`. Unknown id is a 404;
/// someone else's cafe is a 403.
pub(crate) async fn ensure_owned_cafe(
    storage: &Arc<dyn Storage>,
    cafe_id: &str,
    user_id: &str,
) -> Result<Cafe> {
    let cafe = storage
        .get_cafe(cafe_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::CafeNotFound))?;
    if cafe.owner_id != user_id {
        return Err(ApiError::forbidden(ErrorCode::Forbidden).into());
    }
    Ok(cafe)
}

#[derive(Debug, Clone)]
pub struct CafeService {
    storage: Arc<dyn Storage>,
    guard: SubscriptionGuard,
    base_url: String,
    logger: MenuLogger,
}

impl CafeService {
    pub fn new(storage: Arc<dyn Storage>, base_url: impl Into<String>, logger: MenuLogger) -> Self {
        let guard = SubscriptionGuard::new(storage.clone());
        Self {
            storage,
            guard,
            base_url: base_url.into(),
            logger,
        }
    }

    /// All cafes owned by the caller.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Cafe>> {
        self.storage.get_cafes_by_owner(user_id).await
    }

    /// Public menu lookup; no auth, no entitlement checks.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Cafe> {
        self.storage
            .get_cafe_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::CafeNotFound).into())
    }

    /// Create a cafe for `user_id`.
    ///
    /// First visit to the dashboard may land here before the status
    /// endpoint, so a missing subscription row is seeded (7-day trial)
    /// before the limit check runs. The slug is derived from the name
    /// plus a random suffix, and the QR code is rendered immediately so
    /// the cafe is printable from the moment it exists.
    pub async fn create(&self, user_id: &str, request: CreateCafeRequest) -> Result<Cafe> {
        if self.storage.get_subscription(user_id).await?.is_none() {
            match self.storage.create_subscription(user_id).await {
                Ok(_) => {}
                Err(menuqr_core::error::MenuQrError::Duplicate(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let decision = self.guard.can_create_cafe(user_id).await?;
        let sub = self.deny_to_error(decision, ErrorCode::PlanLimitReached)?;

        let theme = request.theme;
        if theme.is_premium() && !has_premium_access(&sub) {
            return Err(ApiError::forbidden(ErrorCode::PremiumThemeRequiresPro).into());
        }

        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "My Cafe".to_string());

        // The slug suffix is short, so retry with a fresh one if a
        // collision slips through.
        let mut attempt = 0;
        let cafe = loop {
            let slug = slugify(&name);
            let qr_code_url = qr_svg_data_url(&menu_url(&self.base_url, &slug))?;
            let result = self
                .storage
                .create_cafe(NewCafe {
                    owner_id: user_id.to_string(),
                    name: name.clone(),
                    description: request.description.clone(),
                    slug,
                    address: request.address.clone(),
                    logo_url: request.logo_url.clone(),
                    qr_code_url: Some(qr_code_url),
                    menu_type: request.menu_type,
                    image_menu_urls: request.image_menu_urls.clone(),
                    theme,
                })
                .await;
            match result {
                Ok(cafe) => break cafe,
                Err(menuqr_core::error::MenuQrError::Duplicate(_)) if attempt < 3 => {
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        self.logger
            .info(&format!("created cafe {} ({}) for user {user_id}", cafe.id, cafe.slug));
        Ok(cafe)
    }

    /// Update a cafe the caller owns. The slug (and therefore the QR
    /// code) never changes after creation.
    pub async fn update(&self, user_id: &str, cafe_id: &str, updates: CafeUpdate) -> Result<Cafe> {
        ensure_owned_cafe(&self.storage, cafe_id, user_id).await?;
        let sub = self.guard.require_active_subscription(user_id).await?;

        if let Some(theme) = updates.theme {
            if theme.is_premium() && !has_premium_access(&sub) {
                return Err(ApiError::forbidden(ErrorCode::PremiumThemeRequiresPro).into());
            }
        }

        self.storage.update_cafe(cafe_id, updates).await
    }

    /// Delete a cafe the caller owns, with its categories, items, and
    /// offers.
    pub async fn delete(&self, user_id: &str, cafe_id: &str) -> Result<()> {
        ensure_owned_cafe(&self.storage, cafe_id, user_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        self.storage.delete_cafe(cafe_id).await?;
        self.logger.info(&format!("deleted cafe {cafe_id}"));
        Ok(())
    }

    /// Convert a denied decision into a 403 carrying its reason.
    fn deny_to_error(&self, decision: GuardDecision, code: ErrorCode) -> Result<Subscription> {
        if decision.allowed {
            if let Some(sub) = decision.subscription {
                return Ok(sub);
            }
        }
        let code = if decision.subscription.is_none() && !decision.allowed {
            ErrorCode::NoSubscriptionFound
        } else {
            code
        };
        Err(ApiError::forbidden_reason(
            code,
            decision.reason.unwrap_or_else(|| code.to_string()),
        )
        .into())
    }
}
