//! Generic backend answers

use serde::{Deserialize, Serialize};

/// Acknowledgement carrying an optional human-readable message
///
/// Accepts an object with `message`/`error`, a bare string, or nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Acknowledgement")]
pub struct MessageResponse {
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Acknowledgement {
    Empty(()),
    Text(String),
    Fields {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl From<Acknowledgement> for MessageResponse {
    fn from(ack: Acknowledgement) -> Self {
        match ack {
            Acknowledgement::Empty(()) => Self::default(),
            Acknowledgement::Text(message) => Self {
                message: Some(message),
                error: None,
            },
            Acknowledgement::Fields { message, error } => Self { message, error },
        }
    }
}

impl MessageResponse {
    /// The backend's message, or `fallback` when none was sent
    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// Answer to a customer or provider registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub user_id: i64,
    pub mobile_number: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_acknowledgement_shapes() {
        let text: MessageResponse = serde_json::from_value(json!("OTP sent")).unwrap();
        assert_eq!(text.message_or("fallback"), "OTP sent");

        let object: MessageResponse =
            serde_json::from_value(json!({ "message": "Done", "extra": 1 })).unwrap();
        assert_eq!(object.message.as_deref(), Some("Done"));

        let empty: MessageResponse = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(empty.message_or("Password changed"), "Password changed");
    }
}
