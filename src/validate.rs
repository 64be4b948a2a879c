//! Form validation for add/edit submissions.
//!
//! Validation is stateless and reports each field independently so the
//! shell can show per-field errors. A commit may only proceed when the
//! returned `Validation` has no errors.

use once_cell::sync::Lazy;
use regex::Regex;

/// Loose email shape check: something before the @, something after it
/// containing a dot, no whitespace or second @ anywhere.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// The structured add/edit payload: exactly the two editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub name: String,
    pub email: String,
}

impl UserInput {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Empty,
    BadFormat,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::Empty => "must not be empty",
            FieldError::BadFormat => "must look like name@domain.tld",
        }
    }
}

/// Per-field validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub name_error: Option<FieldError>,
    pub email_error: Option<FieldError>,
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        self.name_error.is_none() && self.email_error.is_none()
    }
}

/// Check a proposed name/email pair. Idempotent; no side effects.
pub fn validate(name: &str, email: &str) -> Validation {
    let name_error = if name.trim().is_empty() {
        Some(FieldError::Empty)
    } else {
        None
    };

    let email = email.trim();
    let email_error = if email.is_empty() {
        Some(FieldError::Empty)
    } else if !EMAIL_RE.is_match(email) {
        Some(FieldError::BadFormat)
    } else {
        None
    };

    Validation {
        name_error,
        email_error,
    }
}
