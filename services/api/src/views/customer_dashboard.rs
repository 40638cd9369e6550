//! Customer dashboard: profile and service requests

use auth::{Role, SessionStore};
use common::ApiError;
use tracing::{info, warn};

use super::{ViewState, gate};
use crate::error::{ViewError, ViewResult};
use crate::middleware::{guarded, require_role};
use crate::models::{Booking, CustomerProfile, from_user};
use crate::repositories::{CustomerRepository, UserRepository};
use crate::state::AppState;

const PROFILE_DENIED: &str = "Access Denied. You do not have permission to view this profile.";
const BOOKINGS_DENIED: &str = "Access Denied. You do not have permission to view these bookings.";

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDashboardData {
    pub profile: CustomerProfile,
    pub bookings: Vec<Booking>,
    /// Problems that did not prevent the dashboard from rendering
    pub notices: Vec<String>,
}

pub struct CustomerDashboard {
    session: SessionStore,
    users: UserRepository,
    customers: CustomerRepository,
}

impl CustomerDashboard {
    pub fn new(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            users: state.user_repository.clone(),
            customers: state.customer_repository.clone(),
        }
    }

    /// Load the profile, refresh the session user from it, then the bookings
    pub async fn load(&self) -> ViewResult<ViewState<CustomerDashboardData>> {
        if let Some(state) = gate(&self.session, Role::Customer) {
            return Ok(state);
        }
        let credentials = require_role(
            &self.session,
            Role::Customer,
            "Access Denied. This dashboard is for customers.",
        )?;

        let mut notices = Vec::new();
        let profile = match guarded(
            &self.session,
            self.users.get(&credentials.token, credentials.user_id),
        )
        .await
        {
            Ok(fresh) => {
                let merged = self.session.update_user(&fresh)?;
                from_user(&merged).map_err(|e| ApiError::Decode(e.to_string()))?
            }
            Err(ViewError::Api(ApiError::Forbidden(_))) => {
                warn!("Profile of user {} is forbidden", credentials.user_id);
                notices.push(PROFILE_DENIED.to_string());
                from_user(&credentials.user).unwrap_or_default()
            }
            Err(err) => return Err(err),
        };

        let bookings = match guarded(&self.session, self.customers.bookings(&credentials.token)).await
        {
            Ok(bookings) => bookings,
            Err(ViewError::Api(ApiError::Forbidden(_))) => {
                notices.push(BOOKINGS_DENIED.to_string());
                Vec::new()
            }
            Err(ViewError::Api(err)) => {
                notices.push(format!("Failed to load bookings: {}", err.user_message()));
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        info!(
            "Customer dashboard loaded with {} booking(s)",
            bookings.len()
        );

        Ok(ViewState::Ready(CustomerDashboardData {
            profile,
            bookings,
            notices,
        }))
    }
}
