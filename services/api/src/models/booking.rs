//! Service requests (bookings) between customers and providers

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking as reported by the backend
///
/// The client never decides transitions; unknown states are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
    Rejected,
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Accepted => "ACCEPTED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Other(status) => status,
        }
    }

    /// Whether a customer may still cancel
    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Accepted)
    }
}

impl From<String> for BookingStatus {
    fn from(status: String) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "PENDING" => BookingStatus::Pending,
            "ACCEPTED" => BookingStatus::Accepted,
            "COMPLETED" => BookingStatus::Completed,
            "CANCELLED" => BookingStatus::Cancelled,
            "REJECTED" => BookingStatus::Rejected,
            _ => BookingStatus::Other(status),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service request as listed on the dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub provider_id: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub service_date: Option<NaiveDate>,
    #[serde(default)]
    pub service_time: Option<NaiveTime>,
    pub status: BookingStatus,
    #[serde(default)]
    pub rated: bool,
}

impl Booking {
    /// Completed and not yet rated
    pub fn can_rate(&self) -> bool {
        self.status == BookingStatus::Completed && !self.rated
    }
}

/// Body of `POST /api/customers/requests`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRequest {
    pub provider_id: i64,
    pub service_type: String,
    pub description: String,
    pub service_date: NaiveDate,
    /// Serialized as `HH:MM:SS`
    pub service_time: NaiveTime,
}

/// Body of `PUT /api/provider/requests/status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub service_request_id: i64,
    pub new_status: BookingStatus,
}

/// Body of `PUT /api/customers/requests/cancel`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub service_request_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_status_is_kept() {
        let booking: Booking = serde_json::from_value(json!({
            "id": 11,
            "status": "IN_PROGRESS",
            "serviceDate": "2024-06-01",
            "serviceTime": "10:30:00"
        }))
        .unwrap();
        assert_eq!(booking.status, BookingStatus::Other("IN_PROGRESS".to_string()));
        assert_eq!(booking.service_time, NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(json!(booking.status), json!("IN_PROGRESS"));
    }

    #[test]
    fn test_new_request_sends_seconds() {
        let request = NewServiceRequest {
            provider_id: 3,
            service_type: "PLUMBER".to_string(),
            description: "Leaking tap".to_string(),
            service_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            service_time: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["serviceTime"], "09:05:00");
        assert_eq!(body["serviceDate"], "2024-06-01");
        assert_eq!(body["providerId"], 3);
    }
}
