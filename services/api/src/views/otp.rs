//! Mobile number verification by one-time password

use auth::models::{OtpRequest, OtpVerification};
use auth::validation::{validate_otp, validate_phone};
use auth::{AuthClient, RateLimiter};
use tracing::info;

use crate::error::{ViewError, ViewResult};
use crate::state::AppState;

pub struct OtpView {
    auth: AuthClient,
    limiter: RateLimiter,
}

impl OtpView {
    pub fn new(state: &AppState) -> Self {
        Self {
            auth: state.auth.clone(),
            limiter: state.otp_limiter.clone(),
        }
    }

    /// Text a fresh OTP, at most once per cooldown window
    pub async fn request(&self, user_id: i64, mobile_number: &str) -> ViewResult<String> {
        validate_phone(mobile_number)?;

        let key = format!("{}:{}", user_id, mobile_number);
        self.limiter.check(&key).await.map_err(ViewError::Cooldown)?;

        let request = OtpRequest {
            user_id,
            mobile_number: mobile_number.to_string(),
        };
        match self.auth.request_otp(&request).await {
            Ok(response) => Ok(response.message_or("OTP sent successfully!")),
            Err(err) => {
                // A failed send does not start the cooldown
                self.limiter.reset(&key).await;
                Err(err.into())
            }
        }
    }

    pub async fn verify(&self, user_id: i64, mobile_number: &str, code: &str) -> ViewResult<String> {
        validate_otp(code)?;

        let response = self
            .auth
            .verify_otp(&OtpVerification {
                user_id,
                mobile_number: mobile_number.to_string(),
                otp_code: code.trim().to_string(),
            })
            .await?;
        info!("Mobile number verified for user {}", user_id);

        self.limiter
            .reset(&format!("{}:{}", user_id, mobile_number))
            .await;
        Ok(response.message_or("Mobile number verified successfully!"))
    }
}
