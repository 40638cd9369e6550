//! Account settings: password change and account deletion

use auth::models::ChangePassword;
use auth::validation::{validate_password, validate_password_confirmation};
use auth::{AuthClient, SessionStore};
use tracing::info;

use crate::error::{ViewError, ViewResult};
use crate::middleware::{guarded, require_session};
use crate::repositories::UserRepository;
use crate::routes::Route;
use crate::state::AppState;

const NOT_SIGNED_IN: &str = "Please log in to manage your account.";

pub struct SettingsView {
    session: SessionStore,
    auth: AuthClient,
    users: UserRepository,
}

impl SettingsView {
    pub fn new(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            auth: state.auth.clone(),
            users: state.user_repository.clone(),
        }
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ViewResult<String> {
        if current_password.is_empty() {
            return Err(ViewError::Invalid(
                "Current password is required".to_string(),
            ));
        }
        validate_password(new_password)?;
        validate_password_confirmation(new_password, confirm_password)?;

        let credentials = require_session(&self.session, NOT_SIGNED_IN)?;
        let change = ChangePassword {
            user_id: credentials.user_id,
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        let response = guarded(
            &self.session,
            self.auth.change_password(&credentials.token, &change),
        )
        .await?;

        Ok(response.message_or("Password changed successfully!"))
    }

    /// Delete the account, then sign out
    pub async fn delete_account(&self) -> ViewResult<(String, Route)> {
        let credentials = require_session(&self.session, NOT_SIGNED_IN)?;
        let message = guarded(
            &self.session,
            self.users.delete(&credentials.token, credentials.user_id),
        )
        .await?;

        info!("Account {} deleted", credentials.user_id);
        self.session.logout();
        Ok((
            message.unwrap_or_else(|| "Account deleted successfully.".to_string()),
            Route::Landing,
        ))
    }
}
