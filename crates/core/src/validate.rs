//! Input validation helpers used at the API boundary.

use crate::error::CoreError;

/// Maximum length of a dream title (matches the `VARCHAR(255)` column).
pub const MAX_TITLE_LEN: usize = 255;

/// Validate a dream title: non-empty after trimming, within column bounds.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a segment duration: strictly positive and finite seconds.
pub fn validate_duration(duration_secs: f64) -> Result<(), CoreError> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Segment duration must be a positive number of seconds, got {duration_secs}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_rejected() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Morning dream").is_ok());
    }

    #[test]
    fn oversized_title_rejected() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(validate_title(&long).is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[test]
    fn non_positive_duration_rejected() {
        assert!(validate_duration(0.0).is_err());
        assert!(validate_duration(-1.5).is_err());
        assert!(validate_duration(f64::NAN).is_err());
        assert!(validate_duration(f64::INFINITY).is_err());
        assert!(validate_duration(12.25).is_ok());
    }
}
