//! Custom error types for the marketplace views

use std::time::Duration;

use auth::SessionError;
use common::ApiError;
use thiserror::Error;

use crate::routes::Route;

/// Error surfaced by a view to the user
#[derive(Error, Debug)]
pub enum ViewError {
    /// The session has not finished restoring yet
    #[error("Session is still loading")]
    NotReady,

    /// The action needs a signed-in user
    #[error("{0}")]
    NotSignedIn(String),

    /// The backend rejected the token; the session has been cleared
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    /// The signed-in role may not use this view
    #[error("{message}")]
    WrongRole { message: String, home: Route },

    /// Client-side validation failed
    #[error("{0}")]
    Invalid(String),

    /// A changed phone number has to be verified before saving
    #[error("Phone number changed. Please verify the new number with OTP.")]
    PhoneVerificationRequired,

    /// An OTP was requested too recently
    #[error("Resend OTP in {}s", .0.as_secs().max(1))]
    Cooldown(Duration),

    /// The backend call failed
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// The session could not be updated
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ViewError {
    /// Where the front end should navigate after showing this error
    pub fn redirect(&self) -> Option<Route> {
        match self {
            ViewError::NotSignedIn(_) | ViewError::SessionExpired => Some(Route::Login),
            ViewError::WrongRole { home, .. } => Some(home.clone()),
            _ => None,
        }
    }
}

impl From<String> for ViewError {
    fn from(message: String) -> Self {
        ViewError::Invalid(message)
    }
}

/// Type alias for view results
pub type ViewResult<T> = Result<T, ViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_show_backend_message() {
        let err = ViewError::from(ApiError::Status {
            status: 409,
            message: "Booking already cancelled".to_string(),
        });
        assert_eq!(err.to_string(), "Booking already cancelled");
        assert_eq!(err.redirect(), None);
    }

    #[test]
    fn test_expired_session_redirects_to_login() {
        assert_eq!(ViewError::SessionExpired.redirect(), Some(Route::Login));
        assert_eq!(
            ViewError::Cooldown(Duration::from_millis(200)).to_string(),
            "Resend OTP in 1s"
        );
    }
}
