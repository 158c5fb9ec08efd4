//! Password strength policy

use std::collections::BTreeSet;

use crate::errors::PasswordRule;

const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Check a password against the strength policy
///
/// Every violated rule is reported, not just the first: at least 8
/// characters, one lowercase letter, one uppercase letter, one digit,
/// and one special character from the fixed set.
pub fn validate_password(password: &str) -> Result<(), BTreeSet<PasswordRule>> {
    let mut violations = BTreeSet::new();

    if password.len() < 8 {
        violations.insert(PasswordRule::Short);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.insert(PasswordRule::Lower);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.insert(PasswordRule::Upper);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.insert(PasswordRule::Number);
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        violations.insert(PasswordRule::Special);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
