//! Provider dashboard: own profile and incoming requests

use auth::{Role, SessionStore, SessionUser};
use common::ApiError;
use tracing::{info, warn};

use super::{ViewState, gate};
use crate::error::{ViewError, ViewResult};
use crate::middleware::{guarded, require_role};
use crate::models::{Booking, Provider, from_user};
use crate::repositories::ProviderRepository;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDashboardData {
    pub profile: Option<Provider>,
    pub bookings: Vec<Booking>,
    pub notices: Vec<String>,
}

pub struct ProviderDashboard {
    session: SessionStore,
    providers: ProviderRepository,
}

impl ProviderDashboard {
    pub fn new(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            providers: state.provider_repository.clone(),
        }
    }

    pub async fn load(&self) -> ViewResult<ViewState<ProviderDashboardData>> {
        if let Some(state) = gate(&self.session, Role::Provider) {
            return Ok(state);
        }
        let credentials = require_role(
            &self.session,
            Role::Provider,
            "Access Denied. This dashboard is for providers.",
        )?;

        let mut notices = Vec::new();
        let profile = match guarded(
            &self.session,
            self.providers.profile(&credentials.token, credentials.user_id),
        )
        .await
        {
            Ok(fresh) => {
                self.refresh_identity(&credentials.user, &fresh)?;
                from_user::<Provider>(&fresh).ok()
            }
            Err(ViewError::Api(err)) => {
                warn!("Provider profile failed to load: {}", err);
                notices.push(format!("Failed to load profile: {}", err.user_message()));
                None
            }
            Err(err) => return Err(err),
        };

        let bookings = match guarded(&self.session, self.providers.bookings(&credentials.token)).await
        {
            Ok(bookings) => bookings,
            Err(ViewError::Api(err)) => {
                notices.push(format!("Failed to load requests: {}", err.user_message()));
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        info!(
            "Provider dashboard loaded with {} request(s)",
            bookings.len()
        );

        Ok(ViewState::Ready(ProviderDashboardData {
            profile,
            bookings,
            notices,
        }))
    }

    /// Copy name and email into the session, only when they changed
    fn refresh_identity(&self, current: &SessionUser, fresh: &SessionUser) -> ViewResult<()> {
        let changed = fresh.name().is_some_and(|name| Some(name) != current.name())
            || fresh.email().is_some_and(|email| Some(email) != current.email());
        if !changed {
            return Ok(());
        }

        let mut partial = SessionUser::new();
        if let Some(name) = fresh.name() {
            partial.set("name", name);
        }
        if let Some(email) = fresh.email() {
            partial.set("email", email);
        }
        self.session.update_user(&partial)?;
        Ok(())
    }
}
