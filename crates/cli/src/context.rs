//! Services wired over the environment's configuration.

use std::sync::Arc;

use bookstore_admin::AdminClient;
use bookstore_client::{ApiClient, ApiConfig};
use bookstore_core::clock::{Clock, SystemClock};
use bookstore_core::storage::KeyValueStore;
use bookstore_storefront::Storefront;
use tracing::debug;

use crate::error::CliError;
use crate::store::{FileStore, state_file};

/// Storefront and back office sharing one API client and state file, the
/// way both screens share one browser profile.
pub struct Context {
    pub storefront: Storefront,
    pub admin: AdminClient,
}

impl Context {
    /// # Errors
    ///
    /// Returns a configuration error for a missing or invalid API URL, or a
    /// storage error if the state file cannot be read.
    pub fn from_env() -> Result<Self, CliError> {
        let config = ApiConfig::from_env()?;
        let api = ApiClient::new(&config)?;
        let path = state_file();
        debug!(api = %config.base_url, state = %path.display(), "context ready");

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(path)?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        Ok(Self {
            storefront: Storefront::new(api.clone(), Arc::clone(&store), Arc::clone(&clock)),
            admin: AdminClient::new(api, store, clock),
        })
    }
}
