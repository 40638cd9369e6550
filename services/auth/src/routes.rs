//! Authentication endpoints of the marketplace backend

use common::{ApiClient, ApiError, ApiResult};
use serde_json::Value;
use tracing::info;

use crate::models::{
    ChangePassword, LoginCredentials, MessageResponse, NewCustomer, NewProvider, OtpRequest,
    OtpVerification, RegistrationResponse, SessionUser,
};

pub const LOGIN: &str = "/api/auth/login";
pub const REGISTER_CUSTOMER: &str = "/api/auth/register/customer";
pub const REGISTER_PROVIDER: &str = "/api/auth/register/provider";
pub const CHANGE_PASSWORD: &str = "/api/auth/change-password";
pub const OTP_REQUEST: &str = "/api/auth/public/otp/request";
pub const OTP_VERIFY: &str = "/api/auth/public/otp/verify";

/// Result of a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    /// Bearer token to attach to later calls
    pub token: String,
    /// The whole response body, kept as the session's user record
    pub user: SessionUser,
    pub message: Option<String>,
}

/// Client for the authentication endpoints
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: ApiClient,
}

impl AuthClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a bearer token and user record
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<LoginOutcome> {
        info!("Login attempt for user: {}", credentials.email);

        let body: Value = self.client.post(LOGIN, credentials, None).await?;
        let user = SessionUser::from_value(body)
            .ok_or_else(|| ApiError::Decode("Login response is not an object".to_string()))?;
        let token = user
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("Login response has no token".to_string()))?;
        let message = user
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(LoginOutcome {
            token,
            user,
            message,
        })
    }

    /// Register a customer account; the mobile number still needs an OTP
    pub async fn register_customer(&self, customer: &NewCustomer) -> ApiResult<RegistrationResponse> {
        info!("Registering customer: {}", customer.email);
        self.client.post(REGISTER_CUSTOMER, customer, None).await
    }

    /// Register a provider account; the mobile number still needs an OTP
    pub async fn register_provider(&self, provider: &NewProvider) -> ApiResult<RegistrationResponse> {
        info!("Registering provider: {}", provider.email);
        self.client.post(REGISTER_PROVIDER, provider, None).await
    }

    /// Ask the backend to text an OTP to the mobile number
    pub async fn request_otp(&self, request: &OtpRequest) -> ApiResult<MessageResponse> {
        info!("Requesting OTP for user: {}", request.user_id);
        self.client.post(OTP_REQUEST, request, None).await
    }

    /// Submit the OTP the user received
    pub async fn verify_otp(&self, verification: &OtpVerification) -> ApiResult<MessageResponse> {
        info!("Verifying OTP for user: {}", verification.user_id);
        self.client.post(OTP_VERIFY, verification, None).await
    }

    /// Change the signed-in user's password
    pub async fn change_password(
        &self,
        token: &str,
        change: &ChangePassword,
    ) -> ApiResult<MessageResponse> {
        info!("Changing password for user: {}", change.user_id);
        self.client.put(CHANGE_PASSWORD, change, Some(token)).await
    }
}
