// Subscription guard — the core state machine.
//
// States: trial, active, expired. The only automatic transition is the
// lazy expiry flip (trial/active → expired once the clock passes
// end_date), applied on every read path here; no scheduler exists.
// Status never moves backwards to trial.
//
// Denials are values, not errors: callers branch on `allowed` and show
// `reason` to the user. Only `require_active_subscription` converts a
// denial into a hard 403.

use std::sync::Arc;

use chrono::Utc;

use menuqr_core::error::{ApiError, ErrorCode, Result};
use menuqr_core::models::{PlanType, Subscription, SubscriptionStatus};
use menuqr_core::plans::{cafe_limit, plan_display_name};
use menuqr_core::storage::{Storage, SubscriptionUpdate};

/// Outcome of an entitlement check.
#[derive(Debug, Clone)]
pub struct GuardDecision {
    pub allowed: bool,
    /// Human-readable denial reason, surfaced verbatim as the 403 body.
    pub reason: Option<String>,
    /// The (lazily expired) subscription, when one exists.
    pub subscription: Option<Subscription>,
}

impl GuardDecision {
    pub fn allow(subscription: Option<Subscription>) -> Self {
        Self {
            allowed: true,
            reason: None,
            subscription,
        }
    }

    pub fn deny(reason: impl Into<String>, subscription: Option<Subscription>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            subscription,
        }
    }
}

/// Premium themes (modern/premium) need an active pro plan OR a running
/// trial. An active basic plan does not qualify.
pub fn has_premium_access(sub: &Subscription) -> bool {
    let is_pro_active = sub.status == SubscriptionStatus::Active && sub.plan_type.is_pro();
    let is_trial = sub.status == SubscriptionStatus::Trial;
    is_pro_active || is_trial
}

/// The guard. Cheap to clone; wraps the shared storage handle.
#[derive(Debug, Clone)]
pub struct SubscriptionGuard {
    storage: Arc<dyn Storage>,
}

impl SubscriptionGuard {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Fetch the user's subscription and apply the lazy expiry
    /// transition. Every guard check and every status read goes through
    /// here, so stale `active`/`trial` rows are corrected before anyone
    /// acts on them. The write is last-writer-wins and idempotent.
    pub async fn resolve(&self, user_id: &str) -> Result<Option<Subscription>> {
        let Some(sub) = self.storage.get_subscription(user_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if sub.status != SubscriptionStatus::Expired && now > sub.end_date {
            let updated = self
                .storage
                .update_subscription(
                    user_id,
                    SubscriptionUpdate {
                        status: Some(SubscriptionStatus::Expired),
                        updated_at: Some(now),
                        ..Default::default()
                    },
                )
                .await?;
            return Ok(Some(updated));
        }

        Ok(Some(sub))
    }

    /// Can this user mutate cafes/categories/items/offers right now?
    /// Trial and active both qualify. The guard never auto-creates a
    /// missing subscription — remediation is the caller's call.
    pub async fn can_perform_admin_action(&self, user_id: &str) -> Result<GuardDecision> {
        let Some(sub) = self.resolve(user_id).await? else {
            return Ok(GuardDecision::deny(
                ErrorCode::NoSubscriptionFound.to_string(),
                None,
            ));
        };

        if sub.status == SubscriptionStatus::Expired {
            return Ok(GuardDecision::deny(
                ErrorCode::SubscriptionExpired.to_string(),
                Some(sub),
            ));
        }

        Ok(GuardDecision::allow(Some(sub)))
    }

    /// Can this user purchase `new_plan`? Blocked only while a paid plan
    /// is live and unexpired — trials and lapsed subscribers buy freely,
    /// and a user with no subscription bootstraps one on purchase.
    pub async fn can_purchase_plan(&self, user_id: &str, _new_plan: PlanType) -> Result<GuardDecision> {
        let Some(sub) = self.resolve(user_id).await? else {
            return Ok(GuardDecision::allow(None));
        };

        let now = Utc::now();
        if sub.status == SubscriptionStatus::Active && now <= sub.end_date {
            let reason = format!(
                "Your {} plan is active until {}. You cannot change plans mid-cycle.",
                plan_display_name(sub.plan_type),
                sub.end_date.format("%d/%m/%Y"),
            );
            return Ok(GuardDecision::deny(reason, Some(sub)));
        }

        Ok(GuardDecision::allow(Some(sub)))
    }

    /// Can this user create another cafe? Admin access first, then the
    /// plan-tier cafe limit (2 for trial/basic, effectively unbounded
    /// for pro).
    pub async fn can_create_cafe(&self, user_id: &str) -> Result<GuardDecision> {
        let access = self.can_perform_admin_action(user_id).await?;
        if !access.allowed {
            return Ok(access);
        }

        let plan = access
            .subscription
            .as_ref()
            .map(|s| s.plan_type)
            .unwrap_or(PlanType::Trial);
        let limit = cafe_limit(plan);
        let count = self.storage.get_cafes_by_owner(user_id).await?.len() as i64;

        if count >= limit {
            let tier = if plan == PlanType::Trial {
                "Free Trial"
            } else {
                "Basic Plan"
            };
            return Ok(GuardDecision::deny(
                format!(
                    "You have reached the limit of {limit} cafes for your {tier}. \
                     Upgrade to Pro for unlimited cafes."
                ),
                access.subscription,
            ));
        }

        Ok(GuardDecision::allow(access.subscription))
    }

    /// Admin-action check as a hard requirement: denial becomes a 403.
    pub async fn require_active_subscription(&self, user_id: &str) -> Result<Subscription> {
        let decision = self.can_perform_admin_action(user_id).await?;
        if decision.allowed {
            if let Some(sub) = decision.subscription {
                return Ok(sub);
            }
        }
        let code = if decision.subscription.is_none() {
            ErrorCode::NoSubscriptionFound
        } else {
            ErrorCode::SubscriptionExpired
        };
        Err(ApiError::forbidden_reason(
            code,
            decision.reason.unwrap_or_else(|| code.to_string()),
        )
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use menuqr_core::storage::{NewCafe, Storage};
    use menuqr_core::models::{MenuType, Theme};
    use menuqr_memory::MemoryStorage;

    fn guard_over(storage: &MemoryStorage) -> SubscriptionGuard {
        SubscriptionGuard::new(Arc::new(storage.clone()))
    }

    async fn force_window(storage: &MemoryStorage, user: &str, status: SubscriptionStatus, days_from_now: i64) {
        storage
            .update_subscription(
                user,
                SubscriptionUpdate {
                    status: Some(status),
                    end_date: Some(Utc::now() + Duration::days(days_from_now)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    async fn add_cafe(storage: &MemoryStorage, owner: &str, slug: &str) {
        storage
            .create_cafe(NewCafe {
                owner_id: owner.into(),
                name: "Cafe".into(),
                description: None,
                slug: slug.into(),
                address: None,
                logo_url: None,
                qr_code_url: None,
                menu_type: MenuType::Digital,
                image_menu_urls: vec![],
                theme: Theme::Standard,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fresh_trial_user_is_allowed() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        let guard = guard_over(&storage);

        let decision = guard.can_perform_admin_action("u1").await.unwrap();
        assert!(decision.allowed);
        let sub = decision.subscription.unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Trial);
    }

    #[tokio::test]
    async fn missing_subscription_is_denied_without_creating_one() {
        let storage = MemoryStorage::new();
        let guard = guard_over(&storage);

        let decision = guard.can_perform_admin_action("ghost").await.unwrap();
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("No subscription found"));
        // The guard must not have created a row.
        assert!(storage.get_subscription("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lazy_expiry_flips_status_and_persists() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        // Window already closed but status still says trial.
        force_window(&storage, "u1", SubscriptionStatus::Trial, -1).await;
        let guard = guard_over(&storage);

        let decision = guard.can_perform_admin_action("u1").await.unwrap();
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("Subscription expired"));

        // Persisted, not just computed.
        let stored = storage.get_subscription("u1").await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Expired);

        // And it never flips back.
        let again = guard.resolve("u1").await.unwrap().unwrap();
        assert_eq!(again.status, SubscriptionStatus::Expired);
    }

    #[tokio::test]
    async fn active_unexpired_blocks_purchase() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        force_window(&storage, "u1", SubscriptionStatus::Active, 10).await;
        let guard = guard_over(&storage);

        let decision = guard.can_purchase_plan("u1", PlanType::ProYearly).await.unwrap();
        assert!(!decision.allowed);
        let reason = decision.reason.unwrap();
        assert!(reason.contains("mid-cycle"));
        assert!(reason.contains("active until"));
    }

    #[tokio::test]
    async fn purchase_unblocks_once_window_closes() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        force_window(&storage, "u1", SubscriptionStatus::Active, -1).await;
        let guard = guard_over(&storage);

        let decision = guard.can_purchase_plan("u1", PlanType::BasicMonthly).await.unwrap();
        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn trial_user_can_purchase() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        let guard = guard_over(&storage);
        assert!(guard.can_purchase_plan("u1", PlanType::ProMonthly).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn user_without_subscription_can_purchase() {
        let storage = MemoryStorage::new();
        let guard = guard_over(&storage);
        assert!(guard.can_purchase_plan("new", PlanType::BasicMonthly).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn trial_user_hits_cafe_limit_at_two() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        add_cafe(&storage, "u1", "one-1").await;
        add_cafe(&storage, "u1", "two-2").await;
        let guard = guard_over(&storage);

        let decision = guard.can_create_cafe("u1").await.unwrap();
        assert!(!decision.allowed);
        let reason = decision.reason.unwrap();
        assert!(reason.contains("limit of 2"));
        assert!(reason.contains("Free Trial"));
        assert!(reason.contains("Upgrade to Pro"));
    }

    #[tokio::test]
    async fn basic_plan_limit_message_names_basic() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        storage
            .update_subscription(
                "u1",
                SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Active),
                    plan_type: Some(PlanType::BasicMonthly),
                    end_date: Some(Utc::now() + Duration::days(20)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        add_cafe(&storage, "u1", "one-1").await;
        add_cafe(&storage, "u1", "two-2").await;
        let guard = guard_over(&storage);

        let decision = guard.can_create_cafe("u1").await.unwrap();
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("Basic Plan"));
    }

    #[tokio::test]
    async fn pro_plan_lifts_cafe_limit() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        storage
            .update_subscription(
                "u1",
                SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Active),
                    plan_type: Some(PlanType::ProYearly),
                    end_date: Some(Utc::now() + Duration::days(300)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        for i in 0..5 {
            add_cafe(&storage, "u1", &format!("cafe-{i}")).await;
        }
        let guard = guard_over(&storage);
        assert!(guard.can_create_cafe("u1").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn expired_user_cannot_create_cafe() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        force_window(&storage, "u1", SubscriptionStatus::Expired, -5).await;
        let guard = guard_over(&storage);

        let decision = guard.can_create_cafe("u1").await.unwrap();
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("Subscription expired"));
    }

    #[tokio::test]
    async fn premium_access_matrix() {
        let storage = MemoryStorage::new();
        let trial = storage.create_subscription("u1").await.unwrap();
        assert!(has_premium_access(&trial));

        let basic_active = storage
            .update_subscription(
                "u1",
                SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Active),
                    plan_type: Some(PlanType::BasicMonthly),
                    end_date: Some(Utc::now() + Duration::days(20)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!has_premium_access(&basic_active));

        let pro_active = storage
            .update_subscription(
                "u1",
                SubscriptionUpdate {
                    plan_type: Some(PlanType::ProMonthly),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(has_premium_access(&pro_active));

        let expired = storage
            .update_subscription(
                "u1",
                SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Expired),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!has_premium_access(&expired));
    }

    #[tokio::test]
    async fn require_active_subscription_raises_403() {
        let storage = MemoryStorage::new();
        storage.create_subscription("u1").await.unwrap();
        force_window(&storage, "u1", SubscriptionStatus::Trial, -1).await;
        let guard = guard_over(&storage);

        let err = guard.require_active_subscription("u1").await.unwrap_err();
        match err {
            menuqr_core::error::MenuQrError::Api(api) => {
                assert_eq!(api.status, menuqr_core::error::HttpStatus::Forbidden);
                assert!(api.message.contains("Subscription expired"));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }
}
