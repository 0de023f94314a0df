//! Validation error types and field limits shared by client and server

use std::fmt;

/// Maximum length for project names and document titles
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for project and document descriptions
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Validation error for drafts and editor input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty (or whitespace only) when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a required, length-limited text field. Length is counted in chars.
pub fn require(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    limit(field, value, max)
}

/// Check an optional text field against a length limit
pub fn limit(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 200,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 200 characters"
        );
    }

    #[test]
    fn whitespace_is_empty() {
        assert_eq!(
            require("name", "   \t", MAX_NAME_LEN),
            Err(ValidationError::Empty { field: "name" })
        );
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        // Hebrew letters are two bytes each in UTF-8
        let title = "א".repeat(MAX_NAME_LEN);
        assert!(require("title", &title, MAX_NAME_LEN).is_ok());

        let too_long = "א".repeat(MAX_NAME_LEN + 1);
        let err = require("title", &too_long, MAX_NAME_LEN).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 200, .. }));
    }
}
