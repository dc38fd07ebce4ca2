//! Newsletter form rules, shared by the client form model and the server
//! endpoint so both reject the same input.

use std::sync::LazyLock;

use regex::Regex;

use crate::{error::FieldError, protocol::NewsletterRequest};

pub const NAME_REQUIRED: &str = "Name is required";
pub const INVALID_EMAIL: &str = "Invalid email address";
const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$",
    )
    .expect("email pattern compiles")
});

/// A submission that passed every field rule. Fields are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub name: String,
    pub email: String,
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN
        && !email.starts_with('.')
        && !email.contains("..")
        && EMAIL_RE.is_match(email)
}

pub fn validate_newsletter(request: &NewsletterRequest) -> Result<ValidSubmission, Vec<FieldError>> {
    let name = request.name.trim();
    let email = request.email.trim();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError::new("name", NAME_REQUIRED));
    }
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", INVALID_EMAIL));
    }

    if errors.is_empty() {
        Ok(ValidSubmission {
            name: name.to_string(),
            email: email.to_string(),
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
