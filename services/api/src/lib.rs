//! Marketplace client: endpoints, session guard and view controllers
//!
//! The [`state::AppState`] ties the shared [`common::ApiClient`] and the
//! [`auth::SessionStore`] together; each module under [`views`] is one screen
//! built from it.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod scope;
pub mod state;
pub mod views;

pub use error::{ViewError, ViewResult};
pub use routes::Route;
pub use scope::ViewScope;
pub use state::AppState;
pub use views::ViewState;
