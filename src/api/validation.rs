//! Input validation for API requests.
//!
//! For collecting multiple validation errors and returning them as an
//! ApiError, use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

/// Maximum note title length in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum note content length in characters
pub const MAX_CONTENT_LEN: usize = 50_000;

lazy_static! {
    /// Regex for validating email addresses (syntactic check only)
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate a note title. Empty titles are legal.
pub fn validate_note_title(title: &str) -> Result<(), String> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!(
            "Title is too long (max {} characters)",
            MAX_TITLE_LEN
        ));
    }

    Ok(())
}

/// Validate note content. Empty content is legal.
pub fn validate_note_content(content: &str) -> Result<(), String> {
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(format!(
            "Content is too long (max {} characters)",
            MAX_CONTENT_LEN
        ));
    }

    Ok(())
}

/// Validate that an ID is a well-formed UUID
pub fn validate_uuid(id: &str, field: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("{} must be a valid UUID", field));
    }

    Ok(())
}
