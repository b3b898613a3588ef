use crate::api::errors::ApiError;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

/// Lowercases and trims the address. All lookups and uniqueness checks go
/// through the normalized form.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.len() <= 320
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        });

    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid email address".to_string()))
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email("teacher@school.edu").is_ok());
        assert!(validate_email("a.b+tag@sub.example.com").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@missing-local.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user@.leading-dot.com").is_err());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Student@Example.COM "), "student@example.com");
    }

    #[test]
    fn password_length_floor() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
    }
}
