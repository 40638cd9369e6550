//! Login screen

use auth::models::LoginCredentials;
use auth::validation::validate_email;
use auth::{AuthClient, SessionStore};
use tracing::info;

use crate::error::{ViewError, ViewResult};
use crate::routes::Route;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub struct LoginResult {
    pub route: Route,
    pub message: String,
}

pub struct LoginView {
    auth: AuthClient,
    session: SessionStore,
}

impl LoginView {
    pub fn new(state: &AppState) -> Self {
        Self {
            auth: state.auth.clone(),
            session: state.session.clone(),
        }
    }

    /// Sign in and pick the landing screen for the user's role
    pub async fn submit(&self, email: &str, password: &str) -> ViewResult<LoginResult> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ViewError::Invalid(
                "Email and password are required.".to_string(),
            ));
        }
        validate_email(email)?;

        let outcome = self
            .auth
            .login(&LoginCredentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let route = Route::home_for(outcome.user.role());
        let message = outcome
            .message
            .clone()
            .unwrap_or_else(|| "Login successful!".to_string());
        self.session.login(outcome.token, outcome.user)?;
        info!("Signed in, continuing to {}", route);

        Ok(LoginResult { route, message })
    }

    /// Sign out; always lands on the login screen
    pub fn sign_out(&self) -> Route {
        self.session.logout();
        Route::Login
    }
}
