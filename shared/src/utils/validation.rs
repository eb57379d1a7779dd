//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Pragmatic email shape check: one `@`, a non-empty local part, and a dotted
/// domain. Full RFC 5322 validation is deliberately out of scope; anything
/// that passes here still has to survive a delivery attempt to be useful.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex must compile")
});

/// Check if an email address has a plausible shape
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Check if a string is not empty after trimming
pub fn not_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Check if a string length is within bounds
pub fn length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.len();
    len >= min && len <= max
}
