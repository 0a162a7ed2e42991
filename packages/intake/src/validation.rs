//! Contact detail format checks.

use regex::Regex;
use std::sync::LazyLock;

/// `local@domain.tld` with a two-letter-or-longer alphabetic TLD.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

/// Indian mobile number: optional `+91`, `91` or `0` prefix, then ten
/// digits starting with 6-9.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+91|91|0)?[6-9][0-9]{9}$").expect("valid regex"));

/// Returns whether `email` looks like a deliverable address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Returns whether `phone` is an Indian mobile number.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.in"));
    }

    #[test]
    fn rejects_invalid_email() {
        assert!(!is_valid_email("user@@example"));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn accepts_valid_phone() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+919876543210"));
        assert!(is_valid_phone("09876543210"));
        assert!(is_valid_phone("919876543210"));
    }

    #[test]
    fn rejects_invalid_phone() {
        assert!(!is_valid_phone("1234567890"));
        assert!(!is_valid_phone("98765432"));
        assert!(!is_valid_phone("98765432100"));
        assert!(!is_valid_phone("+19876543210"));
        assert!(!is_valid_phone(""));
    }
}
