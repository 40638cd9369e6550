//! Session guard for view calls
//!
//! Every view that talks to protected endpoints goes through here: the guard
//! hands out the bearer token and user id, enforces the role, and turns a 401
//! from the backend into a logout.

use std::future::Future;

use auth::{Role, SessionStore, SessionUser};
use common::ApiResult;
use tracing::warn;

use crate::error::{ViewError, ViewResult};
use crate::routes::Route;

/// What a protected view needs from the session
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub user_id: i64,
    pub user: SessionUser,
}

impl Credentials {
    pub fn role(&self) -> Option<Role> {
        self.user.role()
    }
}

/// Credentials of the signed-in user
///
/// `not_signed_in` is the message shown when nobody is signed in.
pub fn require_session(session: &SessionStore, not_signed_in: &str) -> ViewResult<Credentials> {
    let state = session.state();
    if !state.is_ready {
        return Err(ViewError::NotReady);
    }

    let Some((token, user)) = state.credentials() else {
        return Err(ViewError::NotSignedIn(not_signed_in.to_string()));
    };
    let user_id = user.user_id().ok_or_else(|| {
        ViewError::NotSignedIn("Your session has no user id. Please log in again.".to_string())
    })?;

    Ok(Credentials {
        token: token.to_string(),
        user_id,
        user: user.clone(),
    })
}

/// Credentials of a signed-in user holding `role`
pub fn require_role(
    session: &SessionStore,
    role: Role,
    wrong_role: &str,
) -> ViewResult<Credentials> {
    let credentials = require_session(session, "Please log in to continue.")?;
    match credentials.role() {
        Some(actual) if actual == role => Ok(credentials),
        actual => Err(ViewError::WrongRole {
            message: wrong_role.to_string(),
            home: Route::home_for(actual),
        }),
    }
}

/// Await a backend call made with the session's token
///
/// A 401 means the token is no longer accepted: the session is cleared and
/// the view is told to send the user back to login.
pub async fn guarded<T, F>(session: &SessionStore, call: F) -> ViewResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    match call.await {
        Ok(value) => Ok(value),
        Err(err) if err.status() == Some(401) => {
            warn!("Backend rejected the session token: {}", err);
            session.logout();
            Err(ViewError::SessionExpired)
        }
        Err(err) => Err(ViewError::Api(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ApiError, MemoryStorage};
    use std::sync::Arc;

    fn store_with(role: &str) -> SessionStore {
        let store = SessionStore::restore(Arc::new(MemoryStorage::new()));
        store
            .login(
                "t1",
                SessionUser::new().with("userId", 7).with("role", role),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_not_ready_store_is_reported() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        assert!(matches!(
            require_session(&store, "Log in first"),
            Err(ViewError::NotReady)
        ));
    }

    #[test]
    fn test_wrong_role_redirects_home() {
        let store = store_with("PROVIDER");
        let err = require_role(&store, Role::Customer, "Only customers can book services.")
            .unwrap_err();
        assert_eq!(err.to_string(), "Only customers can book services.");
        assert_eq!(err.redirect(), Some(Route::ProviderDashboard));

        let credentials = require_role(&store, Role::Provider, "unused").unwrap();
        assert_eq!(credentials.token, "t1");
        assert_eq!(credentials.user_id, 7);
    }

    #[tokio::test]
    async fn test_unauthorized_logs_out() {
        let store = store_with("CUSTOMER");
        let result: ViewResult<()> = guarded(&store, async {
            Err(ApiError::Unauthorized("Token expired".to_string()))
        })
        .await;

        assert!(matches!(result, Err(ViewError::SessionExpired)));
        assert!(!store.is_authenticated());
        assert!(store.is_ready());
    }

    #[tokio::test]
    async fn test_other_errors_keep_the_session() {
        let store = store_with("CUSTOMER");
        let result: ViewResult<()> = guarded(&store, async {
            Err(ApiError::Forbidden("Access Denied".to_string()))
        })
        .await;

        assert!(matches!(result, Err(ViewError::Api(ApiError::Forbidden(_)))));
        assert!(store.is_authenticated());
    }
}
