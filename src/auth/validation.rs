use lazy_static::lazy_static;
use regex::Regex;

use crate::config::PasswordPolicy;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref SPECIAL_RE: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At most one message: missing beats malformed.
pub fn validate_email(email: &str) -> Vec<String> {
    if email.is_empty() {
        return vec!["Email is required".to_string()];
    }
    if !is_valid_email(email) {
        return vec!["Email address is not valid".to_string()];
    }
    Vec::new()
}

/// Every violated rule is reported, not just the first.
pub fn validate_password(password: &str, policy: PasswordPolicy) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit".to_string());
    }
    if policy.require_special && !SPECIAL_RE.is_match(password) {
        errors.push("Password must contain at least one special character".to_string());
    }

    errors
}
