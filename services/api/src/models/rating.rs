//! Ratings left by customers

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A published review of a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default)]
    pub id: Option<i64>,
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Body of `POST /api/customers/ratings`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRating {
    pub service_request_id: i64,
    pub score: u8,
    pub comment: String,
}
