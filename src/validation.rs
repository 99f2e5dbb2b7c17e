use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// First/last names: letters and spaces only, 2..=20 characters.
pub fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < 2 || len > 20 {
        return Err(ApiError::validation(format!(
            "{} must be between 2 and 20 characters",
            field
        )));
    }
    if !value.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(ApiError::validation("Names must consist of letters only."));
    }
    Ok(())
}

const PASSWORD_SPECIALS: &str = "@$!%*#?&";

/// 8..=30 characters drawn from letters, digits and `@$!%*#?&`, with at
/// least one of each class present.
pub fn validate_password_strength(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));

    if len < 8 || len > 30 || !has_letter || !has_digit || !has_special || !allowed {
        return Err(ApiError::validation(
            "Password must be at least 8 characters long and include at least one letter, one number, and one special character.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.org"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaced out@example.com"));
    }

    #[test]
    fn names_must_be_letters() {
        assert!(validate_name("first_name", "Ada").is_ok());
        assert!(validate_name("first_name", "Mary Jane").is_ok());
        assert!(validate_name("first_name", "A").is_err());
        assert!(validate_name("first_name", "R2D2").is_err());
        assert!(validate_name("last_name", &"x".repeat(21)).is_err());
    }

    #[test]
    fn password_strength() {
        assert!(validate_password_strength("Test@1234").is_ok());
        // missing a class each
        assert!(validate_password_strength("alllowercase").is_err());
        assert!(validate_password_strength("NoSpecial1").is_err());
        assert!(validate_password_strength("NoDigits@!").is_err());
        // too short / disallowed character
        assert!(validate_password_strength("T@1a").is_err());
        assert!(validate_password_strength("Test 1234@").is_err());
    }
}
