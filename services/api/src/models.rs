//! Models for the marketplace views

pub mod booking;
pub mod customer;
pub mod message;
pub mod provider;
pub mod rating;

pub use booking::{Booking, BookingStatus, CancelRequest, NewServiceRequest, StatusChange};
pub use customer::{CustomerProfile, CustomerProfileUpdate};
pub use message::{ChatMessage, Conversation, NewMessage};
pub use provider::{Provider, ProviderProfileUpdate, ProviderSearch};
pub use rating::{NewRating, Rating};

use auth::SessionUser;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read a typed view of a loose user record
pub fn from_user<T: DeserializeOwned>(user: &SessionUser) -> Result<T, serde_json::Error> {
    serde_json::from_value(user.clone().into_value())
}

/// Decode a list endpoint that answers with either an array or a message object
///
/// Anything other than an array (`{"message": "No providers found"}` and the
/// like) reads as an empty list.
pub fn list_or_empty<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, serde_json::Error> {
    match body {
        Value::Array(_) => serde_json::from_value(body),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_object_reads_as_empty_list() {
        let providers: Vec<Provider> =
            list_or_empty(json!({ "message": "No providers found for this category" })).unwrap();
        assert!(providers.is_empty());

        let providers: Vec<Provider> =
            list_or_empty(json!([{ "id": 3, "name": "Ravi", "serviceType": "PLUMBER" }])).unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].service_type.as_deref(), Some("PLUMBER"));
    }

    #[test]
    fn test_profile_from_session_user() {
        let user = SessionUser::new()
            .with("userId", 7)
            .with("name", "Asha")
            .with("phoneVerified", true)
            .with("token", "t1");
        let profile: CustomerProfile = from_user(&user).unwrap();
        assert_eq!(profile.id(), Some(7));
        assert_eq!(profile.name.as_deref(), Some("Asha"));
        assert!(profile.phone_verified);
    }
}
