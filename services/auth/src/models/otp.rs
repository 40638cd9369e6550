//! One-time password payloads for mobile number verification

use serde::{Deserialize, Serialize};

/// Request to send an OTP to a mobile number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub user_id: i64,
    pub mobile_number: String,
}

/// OTP submitted for verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerification {
    pub user_id: i64,
    pub mobile_number: String,
    pub otp_code: String,
}
