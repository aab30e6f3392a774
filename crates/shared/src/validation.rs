//! Common validation utilities.

use validator::ValidationError;

/// Maximum accepted length of a login credential field.
pub const MAX_CREDENTIAL_LENGTH: usize = 256;

/// Validates that a string contains at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a credential carries no control characters (newlines, NUL).
pub fn validate_no_control_chars(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_control) {
        let mut err = ValidationError::new("control_chars");
        err.message = Some("Value must not contain control characters".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a login username: not blank and free of control characters.
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value)?;
    validate_no_control_chars(value)
}
