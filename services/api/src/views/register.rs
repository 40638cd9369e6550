//! Registration screens for customers and providers

use auth::AuthClient;
use auth::models::{NewCustomer, NewProvider, RegistrationResponse};
use auth::validation::{validate_customer_registration, validate_provider_registration};

use crate::error::ViewResult;
use crate::state::AppState;

/// A registered account whose mobile number still has to be verified
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVerification {
    pub user_id: i64,
    pub mobile_number: String,
    pub message: String,
}

impl PendingVerification {
    fn from_response(response: RegistrationResponse, fallback: &str) -> Self {
        Self {
            user_id: response.user_id,
            mobile_number: response.mobile_number,
            message: response.message.unwrap_or_else(|| fallback.to_string()),
        }
    }
}

const REGISTERED: &str = "Registration successful! Please verify your mobile number.";

pub struct RegisterView {
    auth: AuthClient,
}

impl RegisterView {
    pub fn new(state: &AppState) -> Self {
        Self {
            auth: state.auth.clone(),
        }
    }

    pub async fn register_customer(
        &self,
        form: &NewCustomer,
        confirm_password: &str,
    ) -> ViewResult<PendingVerification> {
        validate_customer_registration(form, confirm_password)?;
        let response = self.auth.register_customer(form).await?;
        Ok(PendingVerification::from_response(response, REGISTERED))
    }

    pub async fn register_provider(
        &self,
        form: &NewProvider,
        confirm_password: &str,
    ) -> ViewResult<PendingVerification> {
        validate_provider_registration(form, confirm_password)?;
        let response = self.auth.register_provider(form).await?;
        Ok(PendingVerification::from_response(response, REGISTERED))
    }
}
