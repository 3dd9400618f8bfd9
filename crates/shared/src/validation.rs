//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Shape-only email check, matching the registration contract: something,
    /// an @, something, a dot, something. Deliverability is not validated.
    static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
}

/// Password length window for registration and password changes.
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 20;

/// Display-name length window.
pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 30;

/// Username length window.
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 15;

/// Validates the email shape.
pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email address".into());
        Err(err)
    }
}

/// Validates the password length window (6 to 20 characters).
pub fn validate_password_length(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_length");
        err.message = Some("Password must be 6 to 20 characters".into());
        Err(err)
    }
}

/// Validates the display-name length window (3 to 30 characters).
pub fn validate_name_length(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        let mut err = ValidationError::new("name_length");
        err.message = Some("Name must be 3 to 30 characters".into());
        Err(err)
    }
}

/// Validates the username length window (3 to 15 characters).
pub fn validate_username_length(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_length");
        err.message = Some("Username must be 3 to 15 characters".into());
        Err(err)
    }
}

/// Validates that a quantity is non-negative.
pub fn validate_quantity(quantity: f64) -> Result<(), ValidationError> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("quantity_range");
        err.message = Some("Quantity must be non-negative".into());
        Err(err)
    }
}

/// Validates that a use-within day count is non-negative.
///
/// Zero is a valid value: it means the item expires today, not that it has
/// no expiry.
pub fn validate_use_within(days: i32) -> Result<(), ValidationError> {
    if days >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("use_within_range");
        err.message = Some("Use-within days must be non-negative".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_format() {
        assert!(validate_email_format("an@example.com").is_ok());
        assert!(validate_email_format("a.b+c@sub.domain.vn").is_ok());
        assert!(validate_email_format("not-an-email").is_err());
        assert!(validate_email_format("missing@dot").is_err());
        assert!(validate_email_format("has space@example.com").is_err());
        assert!(validate_email_format("").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password_length("123456").is_ok());
        assert!(validate_password_length(&"a".repeat(20)).is_ok());
        assert!(validate_password_length("12345").is_err());
        assert!(validate_password_length(&"a".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_name_length() {
        assert!(validate_name_length("Lan").is_ok());
        assert!(validate_name_length(&"a".repeat(30)).is_ok());
        assert!(validate_name_length("Ab").is_err());
        assert!(validate_name_length(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_name_length_counts_chars_not_bytes() {
        // Vietnamese names are multi-byte in UTF-8
        assert!(validate_name_length("Hồng Ánh").is_ok());
    }

    #[test]
    fn test_validate_username_length() {
        assert!(validate_username_length("lan").is_ok());
        assert!(validate_username_length(&"a".repeat(15)).is_ok());
        assert!(validate_username_length("ab").is_err());
        assert!(validate_username_length(&"a".repeat(16)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0.0).is_ok());
        assert!(validate_quantity(2.5).is_ok());
        assert!(validate_quantity(-0.1).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_use_within() {
        assert!(validate_use_within(0).is_ok());
        assert!(validate_use_within(7).is_ok());
        assert!(validate_use_within(-1).is_err());
    }
}
