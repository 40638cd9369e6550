//! View controllers
//!
//! One struct per screen. A view is built from the [`AppState`](crate::state::AppState)
//! handles it needs, performs that screen's backend calls and returns what the
//! front end renders. Loaders answer with a [`ViewState`]; actions answer with
//! the message to show.

pub mod bookings;
pub mod chat;
pub mod customer_dashboard;
pub mod directory;
pub mod login;
pub mod otp;
pub mod profile;
pub mod provider_dashboard;
pub mod rating;
pub mod register;
pub mod settings;

pub use bookings::BookingsView;
pub use chat::{ChatLine, ChatView};
pub use customer_dashboard::{CustomerDashboard, CustomerDashboardData};
pub use directory::{DirectoryView, ProviderDetails, ProviderPage};
pub use login::{LoginResult, LoginView};
pub use otp::OtpView;
pub use profile::ProfileView;
pub use provider_dashboard::{ProviderDashboard, ProviderDashboardData};
pub use rating::RatingView;
pub use register::{PendingVerification, RegisterView};
pub use settings::SettingsView;

use auth::{Role, SessionStore};

use crate::routes::Route;

/// Outcome of loading a screen
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// The session is still restoring; render nothing yet
    NotReady,
    /// The user may not see this screen; navigate instead
    Redirect(Route),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Gate a role-restricted screen before any fetch happens
pub(crate) fn gate<T>(session: &SessionStore, role: Role) -> Option<ViewState<T>> {
    let route = match role {
        Role::Customer => Route::CustomerDashboard,
        Role::Provider => Route::ProviderDashboard,
        Role::Admin => Route::AdminDashboard,
    };
    match route.resolve(&session.state()) {
        None => Some(ViewState::NotReady),
        Some(resolved) if resolved != route => Some(ViewState::Redirect(resolved)),
        Some(_) => None,
    }
}
