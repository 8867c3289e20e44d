//! Field-level input validation.
//!
//! Payload types implement `validate()` by collecting failures into a
//! [`Validator`]; every failing field is reported, not just the first.

use serde::Serialize;

/// A single failed field with a client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All validation failures for one payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed")]
pub struct ValidationErrors(pub Vec<FieldError>);

/// Accumulator for validation checks.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless `ok` holds.
    pub fn require(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    /// Check the trimmed length of a text field.
    pub fn require_len(&mut self, value: &str, field: &'static str, min: usize, max: usize) {
        let len = value.trim().len();
        self.require(
            (min..=max).contains(&len),
            field,
            format!("must be {min}-{max} characters"),
        );
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Minimal email shape check: one `@` with a dotted, non-empty domain.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

/// Phone numbers: digits plus the usual separators.
pub fn is_valid_phone(value: &str) -> bool {
    !value.trim().is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

/// Password policy for donor accounts: length, case mix, digit, special.
pub fn check_password(v: &mut Validator, password: &str) {
    v.require(
        password.len() >= 8,
        "password",
        "Password must be at least 8 characters long",
    );
    v.require(
        password.chars().any(|c| c.is_ascii_uppercase()),
        "password",
        "Password must contain at least one uppercase letter",
    );
    v.require(
        password.chars().any(|c| c.is_ascii_lowercase()),
        "password",
        "Password must contain at least one lowercase letter",
    );
    v.require(
        password.chars().any(|c| c.is_ascii_digit()),
        "password",
        "Password must contain at least one number",
    );
    v.require(
        password.chars().any(|c| "@$!%*?&#".contains(c)),
        "password",
        "Password must contain at least one special character (@$!%*?&#)",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("donor@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("donor"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("donor@example"));
        assert!(!is_valid_email("donor@.com"));
        assert!(!is_valid_email("do nor@example.com"));
    }

    #[test]
    fn test_phone_shapes() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("0123456789"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_password_policy() {
        let mut v = Validator::new();
        check_password(&mut v, "Str0ng@pass");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        check_password(&mut v, "weak");
        let errors = v.finish().unwrap_err();
        assert!(errors.0.len() >= 3);
        assert!(errors.0.iter().all(|e| e.field == "password"));
    }

    #[test]
    fn test_collects_all_failures() {
        let mut v = Validator::new();
        v.require_len("x", "name", 2, 100);
        v.require(false, "age", "Age must be between 18 and 65");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.0.len(), 2);
        assert_eq!(errors.0[0].field, "name");
        assert_eq!(errors.0[1].field, "age");
    }
}
