//! Input validation utilities
//!
//! Client-side checks run before a form is sent. The backend validates again;
//! these only save a round trip for obviously bad input.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{NewCustomer, NewProvider};

/// Validate that a required field is present
pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[\w.-]+@([\w-]+\.)+[\w-]{2,4}$").expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 6 {
        return Err("Password should be at least 6 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate that the confirmation repeats the password
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), String> {
    if password != confirmation {
        return Err("Passwords do not match".to_string());
    }

    Ok(())
}

/// Validate a 10-digit mobile number
pub fn validate_phone(phone: &str) -> Result<(), String> {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        PHONE_REGEX.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("Failed to compile phone regex"));

    if !regex.is_match(phone) {
        return Err("Phone number must be 10 digits".to_string());
    }

    Ok(())
}

/// Validate an Aadhaar number written as `XXXX XXXX XXXX`
pub fn validate_aadhaar(aadhaar: &str) -> Result<(), String> {
    static AADHAAR_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = AADHAAR_REGEX.get_or_init(|| {
        Regex::new(r"^[2-9][0-9]{3} [0-9]{4} [0-9]{4}$").expect("Failed to compile Aadhaar regex")
    });

    if !regex.is_match(aadhaar) {
        return Err("Aadhaar number must be 12 digits, format: XXXX XXXX XXXX".to_string());
    }

    Ok(())
}

/// Validate a one-time password as typed by the user
pub fn validate_otp(code: &str) -> Result<(), String> {
    let code = code.trim();
    if code.is_empty() {
        return Err("Please enter the OTP".to_string());
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err("OTP must contain only digits".to_string());
    }

    Ok(())
}

/// Validate a customer registration form
pub fn validate_customer_registration(form: &NewCustomer, confirmation: &str) -> Result<(), String> {
    let required = [
        form.name.as_str(),
        form.email.as_str(),
        form.phone.as_str(),
        form.password.as_str(),
        confirmation,
        form.address.as_str(),
    ];
    if required.iter().any(|value| value.trim().is_empty()) {
        return Err("All fields are required".to_string());
    }

    validate_email(&form.email)?;
    validate_password(&form.password)?;
    validate_password_confirmation(&form.password, confirmation)?;
    validate_phone(&form.phone)
}

/// Validate a provider registration form
pub fn validate_provider_registration(form: &NewProvider, confirmation: &str) -> Result<(), String> {
    let required = [
        form.name.as_str(),
        form.email.as_str(),
        form.phone.as_str(),
        form.aadhaar_number.as_str(),
        form.password.as_str(),
        confirmation,
        form.address.as_str(),
        form.service_type.as_str(),
    ];
    if required.iter().any(|value| value.trim().is_empty()) {
        return Err("All fields are required".to_string());
    }

    validate_email(&form.email)?;
    validate_password(&form.password)?;
    validate_password_confirmation(&form.password, confirmation)?;
    validate_aadhaar(&form.aadhaar_number)?;
    validate_phone(&form.phone)
}
