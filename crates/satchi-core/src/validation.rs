//! Client-side validation errors shared by every form.
//!
//! A `ValidationError` always blocks submission before any request is
//! issued. `SubmitError` is what a form's submit path returns: either the
//! form was rejected locally or the backend call failed.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Team size must be between {min} and {max} (currently {actual})")]
    TeamSize { min: u32, max: u32, actual: u32 },

    #[error("Minimum team size cannot exceed maximum ({min} > {max})")]
    InvalidBounds { min: u32, max: u32 },

    #[error("Duplicate email address: {0}")]
    DuplicateEmail(String),

    #[error("Email must end with {0}")]
    EmailDomain(String),

    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ValidationError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Check that an email address belongs to `domain` or one of its subdomains.
pub fn check_email_domain(email: &str, domain: &str) -> Result<(), ValidationError> {
    let email = email.trim().to_lowercase();
    let domain = domain.trim().trim_start_matches('@').to_lowercase();

    let host = match email.split_once('@') {
        Some((local, host)) if !local.is_empty() && !host.contains('@') => host,
        _ => return Err(ValidationError::EmailDomain(domain)),
    };
    if local_part_has_whitespace(&email) {
        return Err(ValidationError::EmailDomain(domain));
    }

    if host == domain || host.ends_with(&format!(".{}", domain)) {
        Ok(())
    } else {
        Err(ValidationError::EmailDomain(domain))
    }
}

fn local_part_has_whitespace(email: &str) -> bool {
    email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_email_domain() {
        assert!(check_email_domain("user@amrita.edu", "amrita.edu").is_ok());
        assert!(check_email_domain("user@cb.amrita.edu", "amrita.edu").is_ok());
        assert!(check_email_domain("  User@CB.Amrita.EDU ", "amrita.edu").is_ok());

        assert!(check_email_domain("user@notamrita.edu", "amrita.edu").is_err());
        assert!(check_email_domain("user@gmail.com", "amrita.edu").is_err());
        assert!(check_email_domain("@amrita.edu", "amrita.edu").is_err());
        assert!(check_email_domain("no-at-sign", "amrita.edu").is_err());
        assert!(check_email_domain("a b@amrita.edu", "amrita.edu").is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::TeamSize { min: 2, max: 4, actual: 5 };
        assert_eq!(err.to_string(), "Team size must be between 2 and 4 (currently 5)");
        assert_eq!(ValidationError::Required("Project topic").to_string(), "Project topic is required");
    }
}
