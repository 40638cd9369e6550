//! Session and authentication for the marketplace client
//!
//! The [`SessionStore`] holds the signed-in identity and bearer token and
//! persists them across restarts. [`AuthClient`] talks to the backend's
//! authentication endpoints; [`validation`] holds the client-side form checks
//! and [`RateLimiter`] throttles OTP resends.

pub mod models;
pub mod rate_limiter;
pub mod routes;
pub mod session;
pub mod validation;

pub use models::{Role, Session, SessionUser};
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use routes::{AuthClient, LoginOutcome};
pub use session::{SessionError, SessionStore, TOKEN_KEY, USER_KEY};
