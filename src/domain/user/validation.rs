//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("Username is required")]
    EmptyUsername,

    #[error("Password is required")]
    EmptyPassword,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Email must be valid")]
    InvalidEmail,
}

const MIN_PASSWORD_LENGTH: usize = 4;

/// Validate a user ID
///
/// Ids are opaque strings; the only rule is that they are not empty.
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    Ok(())
}

/// Validate a login username (presence only)
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.trim().is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }

    Ok(())
}

/// Validate a login password
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Validate an email address
///
/// Structural check only: a single `@`, a non-empty local part, and a dotted
/// domain whose labels are non-empty. No whitespace anywhere.
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.chars().any(char::is_whitespace) {
        return Err(UserValidationError::InvalidEmail);
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or(UserValidationError::InvalidEmail)?;

    if local.is_empty() || domain.contains('@') {
        return Err(UserValidationError::InvalidEmail);
    }

    let labels: Vec<&str> = domain.split('.').collect();

    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}
