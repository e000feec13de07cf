//! Storefront state shared by every service.

use std::sync::Arc;

use bookstore_client::ApiClient;
use bookstore_core::cart::CartStore;
use bookstore_core::clock::Clock;
use bookstore_core::session::Session;
use bookstore_core::storage::KeyValueStore;
use bookstore_core::throttle::ResendThrottle;
use bookstore_core::Email;
use secrecy::SecretString;
use tracing::debug;

use crate::services::account::AccountService;
use crate::services::auth::AuthService;
use crate::services::cart::CartService;
use crate::services::catalog::{CatalogCache, CatalogService};
use crate::services::orders::OrderService;
use crate::services::resend::ResendController;
use crate::services::reviews::ReviewService;
use crate::services::vouchers::VoucherService;

/// Storefront state.
///
/// This struct is cheaply cloneable via `Arc` and gives every service access
/// to the API client, client storage and the clock.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    api: ApiClient,
    clock: Arc<dyn Clock>,
    session: Session,
    throttle: ResendThrottle,
    carts: CartStore,
    cache: CatalogCache,
}

impl Storefront {
    /// Create the storefront over `store` (client storage) and `clock`.
    ///
    /// A still-valid token left in `store` by an earlier run is attached to
    /// `api` right away.
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let session = Session::new(store.clone(), clock.clone());
        let throttle = ResendThrottle::new(store.clone(), clock.clone());
        let carts = CartStore::new(store);

        if let Some(token) = session.access_token() {
            debug!("restoring stored session");
            api.set_token(SecretString::from(token));
        }

        Self {
            inner: Arc::new(StorefrontInner {
                api,
                clock,
                session,
                throttle,
                carts,
                cache: CatalogCache::new(),
            }),
        }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn throttle(&self) -> &ResendThrottle {
        &self.inner.throttle
    }

    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    pub(crate) fn cache(&self) -> &CatalogCache {
        &self.inner.cache
    }

    #[must_use]
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.clone())
    }

    /// Resend-confirmation screen for `email`.
    #[must_use]
    pub fn resend(&self, email: Email) -> ResendController {
        ResendController::new(self.clone(), email)
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.clone())
    }

    #[must_use]
    pub fn cart(&self) -> CartService {
        CartService::new(self.clone())
    }

    #[must_use]
    pub fn orders(&self) -> OrderService {
        OrderService::new(self.clone())
    }

    #[must_use]
    pub fn account(&self) -> AccountService {
        AccountService::new(self.clone())
    }

    #[must_use]
    pub fn reviews(&self) -> ReviewService {
        ReviewService::new(self.clone())
    }

    #[must_use]
    pub fn vouchers(&self) -> VoucherService {
        VoucherService::new(self.clone())
    }
}
