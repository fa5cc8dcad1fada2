// Application context: one storage backend, optional payment gateway,
// and the services built over them. Constructed once at startup and
// shared behind an `Arc` by the HTTP layer.

use std::sync::Arc;

use menuqr_core::env::public_base_url;
use menuqr_core::logger::MenuLogger;
use menuqr_core::storage::Storage;
use menuqr_razorpay::{PaymentGateway, RazorpayClient, RazorpayOptions};

use crate::billing::BillingService;
use crate::cafes::CafeService;
use crate::guard::SubscriptionGuard;
use crate::menu::MenuService;
use crate::offers::OfferService;

#[derive(Debug, Clone)]
pub struct AppContext {
    storage: Arc<dyn Storage>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    razorpay: Option<RazorpayOptions>,
    logger: MenuLogger,
    base_url: String,
}

impl AppContext {
    /// Build a context from the environment: Razorpay credentials from
    /// `RAZORPAY_*`, public base URL from `MENUQR_BASE_URL`. Missing
    /// credentials leave billing in its unconfigured (503) state rather
    /// than failing startup.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let razorpay = RazorpayOptions::from_env();
        let gateway = razorpay
            .clone()
            .map(|o| Arc::new(RazorpayClient::new(o)) as Arc<dyn PaymentGateway>);
        Self {
            storage,
            gateway,
            razorpay,
            logger: MenuLogger::default(),
            base_url: public_base_url(),
        }
    }

    pub fn with_razorpay(mut self, options: RazorpayOptions) -> Self {
        self.gateway = Some(Arc::new(RazorpayClient::new(options.clone())));
        self.razorpay = Some(options);
        self
    }

    /// Swap in a different gateway implementation (tests use fakes).
    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_logger(mut self, logger: MenuLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    pub fn guard(&self) -> SubscriptionGuard {
        SubscriptionGuard::new(self.storage.clone())
    }

    pub fn billing(&self) -> BillingService {
        BillingService::new(
            self.storage.clone(),
            self.gateway.clone(),
            self.razorpay.clone(),
            self.logger.clone(),
        )
    }

    pub fn cafes(&self) -> CafeService {
        CafeService::new(self.storage.clone(), self.base_url.clone(), self.logger.clone())
    }

    pub fn menu(&self) -> MenuService {
        MenuService::new(self.storage.clone())
    }

    pub fn offers(&self) -> OfferService {
        OfferService::new(self.storage.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuqr_memory::MemoryStorage;

    #[test]
    fn explicit_credentials_override_env() {
        let ctx = AppContext::new(Arc::new(MemoryStorage::new()))
            .with_razorpay(RazorpayOptions::new("key", "secret", "whsec"))
            .with_base_url("https://menus.example");
        assert!(ctx.razorpay.is_some());
        assert_eq!(ctx.base_url, "https://menus.example");
    }

    #[tokio::test]
    async fn services_share_one_storage() {
        let storage = MemoryStorage::new();
        let ctx = AppContext::new(Arc::new(storage.clone()));

        // Status auto-creates the trial; the guard sees it through its
        // own service handle.
        ctx.billing().status("u1").await.unwrap();
        let decision = ctx.guard().can_perform_admin_action("u1").await.unwrap();
        assert!(decision.allowed);
    }
}
