//! Form validation helpers shared by the auth flows.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s-]{10,}$").expect("valid regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Ten or more digits, spaces or dashes, with an optional leading `+`.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn is_valid_badge_id(badge_id: &str) -> bool {
    !badge_id.trim().is_empty()
}

pub fn passwords_match(password: &str, confirm: &str) -> bool {
    password == confirm
}

/// Collect a "`<label>` is required" message for every blank field, in
/// input order.
pub fn missing_required_fields(fields: &[(&str, &str)]) -> Vec<String> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| format!("{label} is required"))
        .collect()
}

/// Fail with the first missing-field message, if any.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), CoreError> {
    match missing_required_fields(fields).into_iter().next() {
        Some(message) => Err(CoreError::Validation(message)),
        None => Ok(()),
    }
}

/// Validate an email address entered in a form.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() {
        return Err(CoreError::MissingField {
            field: "email",
            message: "Please enter your email address",
        });
    }
    if !is_valid_email(email.trim()) {
        return Err(CoreError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

/// Validate a new password and its confirmation.
pub fn validate_new_password(password: &str, confirm: Option<&str>) -> Result<(), CoreError> {
    if !is_valid_password(password) {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if let Some(confirm) = confirm {
        if !passwords_match(password, confirm) {
            return Err(CoreError::Validation("Passwords do not match".to_string()));
        }
    }
    Ok(())
}
