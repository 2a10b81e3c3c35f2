// Violation records and configuration errors

use std::fmt;
use thiserror::Error;

/// A single cross-field constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Name of the field the violation is attached to
    pub field: String,

    /// Human-readable violation message
    pub message: String,
}

impl ConstraintViolation {
    /// Create a new constraint violation
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered collection of violations accumulated during one validation pass.
///
/// Append-only and never deduplicated: multiple violations on the same
/// field across different validators are all retained, in the order the
/// validators produced them.
#[derive(Debug, Clone, Default)]
pub struct Violations {
    records: Vec<ConstraintViolation>,
}

impl Violations {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation against a named field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.records.push(ConstraintViolation::new(field, message));
    }

    /// Append an already-built violation record
    pub fn push(&mut self, violation: ConstraintViolation) {
        self.records.push(violation);
    }

    /// Check if any violations were recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the number of recorded violations
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Get all violations in insertion order
    pub fn as_slice(&self) -> &[ConstraintViolation] {
        &self.records
    }

    /// Iterate violations in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintViolation> {
        self.records.iter()
    }

    /// Convert to a JSON representation for API error payloads
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "violations": self.records.iter().map(|v| {
                serde_json::json!({
                    "field": v.field,
                    "message": v.message,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.records {
            writeln!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = ConstraintViolation;
    type IntoIter = std::vec::IntoIter<ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a ConstraintViolation;
    type IntoIter = std::slice::Iter<'a, ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Fatal configuration errors surfaced by the engine.
///
/// These indicate a wiring mistake discovered while resolving validators,
/// not a validation outcome; they abort the pass that hit them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validator construction failed: {0}")]
    ValidatorConstruction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_creation() {
        let violation = ConstraintViolation::new("confirm_password", "Fields do not match.");
        assert_eq!(violation.field, "confirm_password");
        assert_eq!(violation.message, "Fields do not match.");
    }

    #[test]
    fn test_violation_display() {
        let violation = ConstraintViolation::new("email", "invalid email");
        assert_eq!(violation.to_string(), "email: invalid email");
    }

    #[test]
    fn test_violations_preserve_insertion_order() {
        let mut violations = Violations::new();
        violations.add("a", "first");
        violations.add("b", "second");
        violations.add("a", "third");

        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b", "a"]);
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_violations_no_deduplication() {
        let mut violations = Violations::new();
        violations.add("field", "same message");
        violations.push(ConstraintViolation::new("field", "same message"));
        assert_eq!(violations.len(), 2);
        assert_eq!(violations.as_slice()[0], violations.as_slice()[1]);
    }

    #[test]
    fn test_violations_to_json() {
        let mut violations = Violations::new();
        violations.add("age", "must be greater than min_age");

        let json = violations.to_json();
        assert_eq!(json["violations"][0]["field"], "age");
        assert_eq!(json["violations"][0]["message"], "must be greater than min_age");
    }

    #[test]
    fn test_empty_violations() {
        let violations = Violations::new();
        assert!(violations.is_empty());
        assert_eq!(violations.len(), 0);
    }

    #[test]
    fn test_error_message_names_validator() {
        let error = Error::ValidatorConstruction(
            "Failed to instantiate validator for MatchWith: no default".to_string(),
        );
        assert!(error.to_string().contains("Failed to instantiate validator for"));
    }
}
