//! Field-level validation for decoded request bodies.

use std::fmt;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Requests that check their own fields after decoding.
pub trait Validate {
    /// Records every violated constraint.
    fn validate(&self, violations: &mut Violations);
}

/// Collector for field violations, in the order the checks ran.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation unconditionally.
    pub fn push(&mut self, field: &'static str, message: &'static str) -> &mut Self {
        self.0.push(FieldViolation { field, message });
        self
    }

    /// Rejects absent values.
    pub fn not_null<T>(
        &mut self,
        field: &'static str,
        value: Option<&T>,
        message: &'static str,
    ) -> &mut Self {
        if value.is_none() {
            self.push(field, message);
        }
        self
    }

    /// Rejects absent, empty and whitespace-only strings.
    pub fn not_blank(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        message: &'static str,
    ) -> &mut Self {
        if value.is_none_or(|v| v.trim().is_empty()) {
            self.push(field, message);
        }
        self
    }

    /// Rejects present values below `min`.
    pub fn min(
        &mut self,
        field: &'static str,
        value: Option<i64>,
        min: i64,
        message: &'static str,
    ) -> &mut Self {
        if value.is_some_and(|v| v < min) {
            self.push(field, message);
        }
        self
    }

    /// Rejects present values above `max`.
    pub fn max(
        &mut self,
        field: &'static str,
        value: Option<i64>,
        max: i64,
        message: &'static str,
    ) -> &mut Self {
        if value.is_some_and(|v| v > max) {
            self.push(field, message);
        }
        self
    }

    /// Rejects present strings that are not shaped like an email address.
    /// Blank values are left to [`Violations::not_blank`].
    pub fn email(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        message: &'static str,
    ) -> &mut Self {
        if let Some(v) = value
            && !v.trim().is_empty()
            && !is_email(v)
        {
            self.push(field, message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<FieldViolation> {
        self.0
    }
}

/// Single `@`, non-empty local part, dot-separated domain labels.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }

    domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Renders violations as `[field message, field message]`.
pub fn format_violations(violations: &[FieldViolation]) -> String {
    let joined = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}
