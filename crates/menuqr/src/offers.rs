// Offer management. Same gate order as the menu: parent-cafe ownership,
// then the subscription check. Update and delete resolve the offer's
// cafe themselves rather than trusting a cafe id from the request.

use std::sync::Arc;

use menuqr_core::error::{ApiError, ErrorCode, Result};
use menuqr_core::models::Offer;
use menuqr_core::storage::{NewOffer, OfferUpdate, Storage};

use crate::cafes::ensure_owned_cafe;
use crate::guard::SubscriptionGuard;

#[derive(Debug, Clone)]
pub struct OfferService {
    storage: Arc<dyn Storage>,
    guard: SubscriptionGuard,
}

impl OfferService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let guard = SubscriptionGuard::new(storage.clone());
        Self { storage, guard }
    }

    /// Offers for a cafe the caller owns, including inactive and hidden
    /// ones.
    pub async fn list(&self, user_id: &str, cafe_id: &str) -> Result<Vec<Offer>> {
        ensure_owned_cafe(&self.storage, cafe_id, user_id).await?;
        self.storage.get_offers(cafe_id).await
    }

    pub async fn create(&self, user_id: &str, offer: NewOffer) -> Result<Offer> {
        ensure_owned_cafe(&self.storage, &offer.cafe_id, user_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        self.storage.create_offer(offer).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        offer_id: &str,
        updates: OfferUpdate,
    ) -> Result<Offer> {
        let offer = self.owned_offer(user_id, offer_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        self.storage.update_offer(&offer.id, updates).await
    }

    pub async fn delete(&self, user_id: &str, offer_id: &str) -> Result<()> {
        let offer = self.owned_offer(user_id, offer_id).await?;
        self.guard.require_active_subscription(user_id).await?;
        self.storage.delete_offer(&offer.id).await
    }

    async fn owned_offer(&self, user_id: &str, offer_id: &str) -> Result<Offer> {
        let offer = self
            .storage
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::OfferNotFound))?;
        ensure_owned_cafe(&self.storage, &offer.cafe_id, user_id).await?;
        Ok(offer)
    }
}
