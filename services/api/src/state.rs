//! Application state shared across views

use std::sync::Arc;

use auth::{AuthClient, RateLimiter, RateLimiterConfig, SessionStore};
use common::{ApiClient, ApiResult, ClientConfig, DurableStorage};

use crate::repositories::{
    CustomerRepository, DirectoryRepository, ProviderRepository, UserRepository,
    messaging::MessagingRepository,
};

/// Everything a view can be built from
///
/// Cloning is cheap; every field is a handle.
#[derive(Debug, Clone)]
pub struct AppState {
    pub session: SessionStore,
    pub auth: AuthClient,
    pub user_repository: UserRepository,
    pub customer_repository: CustomerRepository,
    pub provider_repository: ProviderRepository,
    pub directory_repository: DirectoryRepository,
    pub messaging_repository: MessagingRepository,
    pub otp_limiter: RateLimiter,
}

impl AppState {
    /// Build the state from configuration, restoring the persisted session
    ///
    /// The OTP cooldown is kept in the same storage as the session, so it
    /// holds across separate runs of the client.
    pub fn new(config: &ClientConfig, storage: Arc<dyn DurableStorage>) -> ApiResult<Self> {
        let client = ApiClient::new(config)?;
        let mut state = Self::with_client(client, SessionStore::restore(storage.clone()));
        state.otp_limiter = RateLimiter::with_storage(RateLimiterConfig::default(), storage);
        Ok(state)
    }

    pub fn with_client(client: ApiClient, session: SessionStore) -> Self {
        Self {
            session,
            auth: AuthClient::new(client.clone()),
            user_repository: UserRepository::new(client.clone()),
            customer_repository: CustomerRepository::new(client.clone()),
            provider_repository: ProviderRepository::new(client.clone()),
            directory_repository: DirectoryRepository::new(client.clone()),
            messaging_repository: MessagingRepository::new(client),
            otp_limiter: RateLimiter::default(),
        }
    }
}
