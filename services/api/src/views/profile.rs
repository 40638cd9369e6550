//! Editing the signed-in user's profile

use auth::validation::{validate_email, validate_phone, validate_required};
use auth::{Role, SessionStore, SessionUser};
use tracing::info;

use crate::error::{ViewError, ViewResult};
use crate::middleware::{guarded, require_role};
use crate::models::{CustomerProfileUpdate, ProviderProfileUpdate};
use crate::repositories::{CustomerRepository, ProviderRepository};
use crate::state::AppState;

pub struct ProfileView {
    session: SessionStore,
    customers: CustomerRepository,
    providers: ProviderRepository,
}

impl ProfileView {
    pub fn new(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            customers: state.customer_repository.clone(),
            providers: state.provider_repository.clone(),
        }
    }

    /// Save a customer profile and merge the answer into the session
    ///
    /// A changed phone number must have been verified by OTP first.
    pub async fn save_customer(
        &self,
        update: &CustomerProfileUpdate,
        new_phone_verified: bool,
    ) -> ViewResult<SessionUser> {
        let credentials = require_role(
            &self.session,
            Role::Customer,
            "Only customers can edit this profile.",
        )?;
        validate_required("Name", &update.name)?;
        validate_email(&update.email)?;
        validate_phone(&update.phone)?;

        let phone_changed = credentials.user.phone() != Some(update.phone.as_str());
        if phone_changed && !new_phone_verified {
            return Err(ViewError::PhoneVerificationRequired);
        }

        let saved = guarded(
            &self.session,
            self.customers.update_profile(&credentials.token, update),
        )
        .await?;
        info!("Customer profile saved for user {}", credentials.user_id);
        Ok(self.session.update_user(&saved)?)
    }

    pub async fn save_provider(&self, update: &ProviderProfileUpdate) -> ViewResult<SessionUser> {
        let credentials = require_role(
            &self.session,
            Role::Provider,
            "Only providers can edit this profile.",
        )?;
        validate_required("Name", &update.name)?;
        validate_required("Service type", &update.service_type)?;
        validate_email(&update.email)?;
        validate_phone(&update.phone)?;

        let saved = guarded(
            &self.session,
            self.providers.update_profile(&credentials.token, update),
        )
        .await?;
        info!("Provider profile saved for user {}", credentials.user_id);
        Ok(self.session.update_user(&saved)?)
    }
}
