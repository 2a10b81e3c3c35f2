// Shipped reference constraints

use crate::metadata::{ConstraintMarker, FieldLayout};
use crate::traits::{get_field_value, CrossFieldValidator, FieldSource};
use crate::Violations;
use serde_json::Value;
use std::any::Any;
use std::cmp::Ordering;

const MATCH_WITH_MESSAGE: &str = "Fields do not match.";
const GREATER_THAN_MESSAGE: &str = "Field must be greater than {field}.";

/// Marks a field that must equal another named field.
///
/// The canonical cross-field constraint: two absent fields are vacuously
/// equal; one absent side is a violation; otherwise the values must
/// compare equal. The violation is attached to the annotated field.
#[derive(Debug, Clone)]
pub struct MatchWith {
    field: &'static str,
    message: Option<&'static str>,
}

impl MatchWith {
    /// Require the annotated field to equal `field`
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            message: None,
        }
    }

    /// Override the default violation message
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// The target field the annotated field must equal
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The violation message for this occurrence
    pub fn message(&self) -> &'static str {
        self.message.unwrap_or(MATCH_WITH_MESSAGE)
    }
}

impl ConstraintMarker for MatchWith {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Validator backing [`MatchWith`].
#[derive(Debug, Default)]
pub struct MatchWithValidator;

impl CrossFieldValidator for MatchWithValidator {
    fn is_valid(
        &self,
        obj: &dyn FieldSource,
        layout: &FieldLayout<'_>,
        violations: &mut Violations,
    ) -> bool {
        let before = violations.len();

        layout.for_each_annotated::<MatchWith>(|field, marker| {
            let value = get_field_value(obj, field.name());
            let other = get_field_value(obj, marker.field());

            let matches = match (&value, &other) {
                (None, None) => true,
                (Some(value), Some(other)) => value == other,
                _ => false,
            };

            if !matches {
                violations.add(field.name(), marker.message());
            }
        });

        violations.len() == before
    }

    fn name(&self) -> &'static str {
        "MatchWithValidator"
    }
}

crate::register_validator!(MatchWith, MatchWithValidator);

/// Marks a field that must compare strictly greater than another named
/// field.
///
/// Numbers compare numerically and strings lexicographically. An absent
/// side or incomparable value kinds is a violation. The default message
/// template substitutes `{field}` with the target field name.
#[derive(Debug, Clone)]
pub struct GreaterThan {
    field: &'static str,
    message: Option<&'static str>,
}

impl GreaterThan {
    /// Require the annotated field to exceed `field`
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            message: None,
        }
    }

    /// Override the default violation message template
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// The target field the annotated field must exceed
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The violation message for this occurrence, with `{field}`
    /// substituted by the target field name
    pub fn message(&self) -> String {
        self.message
            .unwrap_or(GREATER_THAN_MESSAGE)
            .replace("{field}", self.field)
    }
}

impl ConstraintMarker for GreaterThan {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Validator backing [`GreaterThan`].
#[derive(Debug, Default)]
pub struct GreaterThanValidator;

impl CrossFieldValidator for GreaterThanValidator {
    fn is_valid(
        &self,
        obj: &dyn FieldSource,
        layout: &FieldLayout<'_>,
        violations: &mut Violations,
    ) -> bool {
        let before = violations.len();

        layout.for_each_annotated::<GreaterThan>(|field, marker| {
            let value = get_field_value(obj, field.name());
            let other = get_field_value(obj, marker.field());

            let greater = match (&value, &other) {
                (Some(value), Some(other)) => {
                    compare_values(value, other) == Some(Ordering::Greater)
                }
                _ => false,
            };

            if !greater {
                violations.add(field.name(), marker.message());
            }
        });

        violations.len() == before
    }

    fn name(&self) -> &'static str {
        "GreaterThanValidator"
    }
}

crate::register_validator!(GreaterThan, GreaterThanValidator);

/// Compare two field values of like kind. Mixed or non-ordered kinds are
/// incomparable.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
