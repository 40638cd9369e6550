//! User model and related functionality

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Role;

/// User record held by the session
///
/// The record is kept as the JSON object the backend sent, so fields this
/// client does not know about survive persistence and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionUser(Map<String, Value>);

impl SessionUser {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; anything other than an object is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a single field
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Get a single field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// All fields of the record
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Identifier of the user (`userId`, falling back to `id`)
    pub fn user_id(&self) -> Option<i64> {
        ["userId", "id"]
            .iter()
            .find_map(|key| self.get(key).and_then(as_id))
    }

    /// Role tag; `None` when missing or not one of the known roles
    pub fn role(&self) -> Option<Role> {
        self.str_field("role").and_then(|role| role.parse().ok())
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    pub fn phone(&self) -> Option<&str> {
        self.str_field("phone")
    }

    /// Whether the backend marked the account as verified
    pub fn account_verified(&self) -> bool {
        self.get("accountVerified")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Shallow merge: every top-level field of `partial` overwrites ours
    ///
    /// The user id is never lost: if the merge leaves `userId` empty while the
    /// previous record had one, the previous value is put back.
    pub fn merged(&self, partial: &SessionUser) -> SessionUser {
        let mut merged = self.0.clone();
        for (key, value) in &partial.0 {
            merged.insert(key.clone(), value.clone());
        }

        let lost_id = merged.get("userId").and_then(as_id).is_none();
        if lost_id {
            if let Some(previous) = self.0.get("userId").filter(|v| as_id(v).is_some()) {
                merged.insert("userId".to_string(), previous.clone());
            }
        }

        SessionUser(merged)
    }

    /// Short label for logs
    pub fn label(&self) -> String {
        self.email()
            .map(str::to_string)
            .or_else(|| self.user_id().map(|id| id.to_string()))
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}

impl From<Map<String, Value>> for SessionUser {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// User login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Customer registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

/// Provider registration payload
///
/// The Aadhaar number is sent with its spaces (`XXXX XXXX XXXX`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewProvider {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub aadhaar_number: String,
    pub service_type: String,
}

/// Password change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub user_id: i64,
    pub current_password: String,
    pub new_password: String,
}
