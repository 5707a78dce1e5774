use std::sync::LazyLock;

use regex::Regex;

use crate::utils::error::CustomError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

pub fn validate_password(password: &str) -> Result<(), CustomError> {
    // Check password length
    if password.len() < 8 || password.len() > 20 {
        return Err(CustomError::ValidationError(
            "Password must be between 8 and 20 characters long.".into(),
        ));
    }

    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_lowercase || !has_uppercase || !has_digit {
        return Err(CustomError::ValidationError(
            "Password must include at least one uppercase letter, one lowercase letter, and one number.".into(),
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CustomError> {
    if !EMAIL_RE.is_match(email) {
        return Err(CustomError::ValidationError(
            "Enter a valid email address.".into(),
        ));
    }
    Ok(())
}
