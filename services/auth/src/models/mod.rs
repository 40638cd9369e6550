//! Session and authentication models

pub mod otp;
pub mod response;
pub mod role;
pub mod session;
pub mod user;

// Re-export for convenience
pub use otp::{OtpRequest, OtpVerification};
pub use response::{MessageResponse, RegistrationResponse};
pub use role::Role;
pub use session::Session;
pub use user::{ChangePassword, LoginCredentials, NewCustomer, NewProvider, SessionUser};
