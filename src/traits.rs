// Validator plugin contract and type-erased field access

use crate::metadata::{CrossFieldSchema, FieldLayout};
use crate::Violations;
use serde_json::Value;

/// Type-erased "read named property" view of an object under validation.
///
/// Implemented for every [`CrossFieldSchema`] type, so validator
/// implementations stay object-safe over arbitrary objects.
pub trait FieldSource {
    /// Read a named field as a JSON value; `None` for unknown fields
    fn field_value(&self, field: &str) -> Option<Value>;
}

impl<T: CrossFieldSchema> FieldSource for T {
    fn field_value(&self, field: &str) -> Option<Value> {
        CrossFieldSchema::field_value(self, field)
    }
}

/// The cross-field constraint plugin contract.
///
/// One instance per marker type is constructed by the validator registry
/// and shared across all validation passes and threads, so implementations
/// must be stateless or internally thread-safe; any per-call state belongs
/// in locals.
///
/// An invocation receives the whole object (to read sibling fields), the
/// full field layout of the object's type, and the shared violation
/// collector for the pass. It returns `false` when the constraint it
/// checks is violated, recording one violation per failed check.
pub trait CrossFieldValidator: Send + Sync + std::fmt::Debug {
    /// Validate one constraint occurrence against the object
    fn is_valid(
        &self,
        obj: &dyn FieldSource,
        layout: &FieldLayout<'_>,
        violations: &mut Violations,
    ) -> bool;

    /// Get validator name (for logging and debugging)
    fn name(&self) -> &'static str;
}

/// Read a named field from the object under validation.
///
/// Absent fields and JSON `null` values both read as `None`, so
/// comparison logic treats a missing property and an empty one uniformly.
/// Never errors.
pub fn get_field_value(obj: &dyn FieldSource, field: &str) -> Option<Value> {
    match obj.field_value(field) {
        Some(Value::Null) | None => None,
        value => value,
    }
}
