//! Navigation targets of the marketplace client

use std::fmt;

use auth::{Role, Session};

/// A screen the front end can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    CustomerDashboard,
    ProviderDashboard,
    AdminDashboard,
    Services,
    ProviderList(String),
    ProviderProfile(i64),
}

impl Route {
    /// Landing screen for a signed-in role; unknown roles land on the home page
    pub fn home_for(role: Option<Role>) -> Route {
        match role {
            Some(Role::Customer) => Route::CustomerDashboard,
            Some(Role::Provider) => Route::ProviderDashboard,
            Some(Role::Admin) => Route::AdminDashboard,
            None => Route::Landing,
        }
    }

    /// Role a route is reserved for
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::CustomerDashboard => Some(Role::Customer),
            Route::ProviderDashboard => Some(Role::Provider),
            Route::AdminDashboard => Some(Role::Admin),
            _ => None,
        }
    }

    /// Where navigating to this route actually ends up for the given session
    ///
    /// Returns `None` while the session is not ready; the caller should wait.
    pub fn resolve(&self, session: &Session) -> Option<Route> {
        if !session.is_ready {
            return None;
        }

        let Some(required) = self.required_role() else {
            return Some(self.clone());
        };

        if !session.is_authenticated() {
            return Some(Route::Login);
        }

        match session.role() {
            Some(role) if role == required => Some(self.clone()),
            role => Some(Route::home_for(role)),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::CustomerDashboard => "/customer-dashboard".to_string(),
            Route::ProviderDashboard => "/provider-dashboard".to_string(),
            Route::AdminDashboard => "/admin-dashboard".to_string(),
            Route::Services => "/services".to_string(),
            Route::ProviderList(category) => format!("/providers/{}", category),
            Route::ProviderProfile(id) => format!("/provider/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::SessionUser;

    fn signed_in(role: &str) -> Session {
        Session {
            user: Some(SessionUser::new().with("userId", 7).with("role", role)),
            token: Some("t1".to_string()),
            is_ready: true,
        }
    }

    #[test]
    fn test_home_for_role() {
        assert_eq!(Route::home_for(Some(Role::Customer)), Route::CustomerDashboard);
        assert_eq!(Route::home_for(Some(Role::Provider)), Route::ProviderDashboard);
        assert_eq!(Route::home_for(None), Route::Landing);
    }

    #[test]
    fn test_dashboards_are_gated() {
        let not_ready = Session::default();
        assert_eq!(Route::CustomerDashboard.resolve(&not_ready), None);

        let signed_out = Session {
            is_ready: true,
            ..Session::default()
        };
        assert_eq!(
            Route::CustomerDashboard.resolve(&signed_out),
            Some(Route::Login)
        );
        assert_eq!(Route::Services.resolve(&signed_out), Some(Route::Services));

        assert_eq!(
            Route::CustomerDashboard.resolve(&signed_in("PROVIDER")),
            Some(Route::ProviderDashboard)
        );
        assert_eq!(
            Route::CustomerDashboard.resolve(&signed_in("CUSTOMER")),
            Some(Route::CustomerDashboard)
        );
        assert_eq!(
            Route::ProviderDashboard.resolve(&signed_in("SOMETHING")),
            Some(Route::Landing)
        );
    }
}
