//! Field-level validation errors for HTML forms.

use std::collections::BTreeMap;

/// Field name to user-facing message.
///
/// Only the first message recorded for a field is kept, so checks can be
/// written from most to least important.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless one is already present.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Record an error when `failed` is true.
    pub fn check(&mut self, failed: bool, field: &'static str, message: &str) {
        if failed {
            self.add(field, message);
        }
    }

    /// Message for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Whether `value` is a URL-safe slug (`a-z`, `0-9`, single dashes).
#[must_use]
pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Whether `value` looks like a phone number: 8-15 digits, optional leading `+`,
/// spaces and dashes ignored.
#[must_use]
pub fn is_phone(value: &str) -> bool {
    let trimmed = value.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = body.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_wins() {
        let mut errors = FieldErrors::new();
        errors.add("email", "required");
        errors.add("email", "invalid");
        assert_eq!(errors.get("email"), Some("required"));
        assert_eq!(errors.len(), 1);
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_empty_errors_is_ok() {
        let errors = FieldErrors::new();
        assert_eq!(errors.into_result(5), Ok(5));
    }

    #[test]
    fn test_is_slug() {
        assert!(is_slug("linen-shirt-2"));
        assert!(!is_slug("Linen"));
        assert!(!is_slug("-lead"));
        assert!(!is_slug("double--dash"));
        assert!(!is_slug(""));
    }

    #[test]
    fn test_is_phone() {
        assert!(is_phone("+84 912-345-678"));
        assert!(is_phone("0912345678"));
        assert!(!is_phone("12345"));
        assert!(!is_phone("09123abc78"));
    }
}
