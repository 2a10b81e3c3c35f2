//! Validation dispatcher - runs one cross-field validation pass over one
//! object and merges the results into the host framework's reporting
//! channel.
//!
//! The dispatcher consults the per-type field metadata cache, resolves
//! each attached marker through the validator registry, invokes every
//! bound validator, and aggregates the results. Evaluation never
//! short-circuits: all markers on all fields are checked in one pass so
//! every violation is discovered before reporting.

use crate::errors::{Error, Violations};
use crate::metadata::{fields_of, CrossFieldSchema, FieldLayout};
use crate::registry::ValidatorRegistry;
use crate::traits::FieldSource;
use std::panic::{self, AssertUnwindSafe};
use tracing::{trace, warn};

/// The host framework's reporting channel for a failed pass.
///
/// On failure the dispatcher first suppresses the host's default
/// violation message, then registers each violation record as a
/// property-scoped violation so downstream consumers can map errors to
/// form fields. A valid pass never touches the context.
pub trait ConstraintContext {
    /// Suppress the default violation the host would otherwise synthesize
    fn disable_default_violation(&mut self);

    /// Register a violation message scoped to the named property
    fn add_property_violation(&mut self, field: &str, message: &str);
}

/// The result of one validation pass.
///
/// `is_valid` is `false` when any constraint failed or any validator
/// invocation faulted during the pass.
#[derive(Debug)]
pub struct ValidationOutcome {
    valid: bool,
    violations: Violations,
}

impl ValidationOutcome {
    /// Whether every constraint held
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The violations recorded during the pass, in collection order
    pub fn violations(&self) -> &Violations {
        &self.violations
    }

    /// Consume the outcome, keeping only the violations
    pub fn into_violations(self) -> Violations {
        self.violations
    }
}

/// Cross-field validation dispatcher.
///
/// One processor is expected to serve the whole host framework; `check`
/// and `validate` are safe to call concurrently from multiple threads
/// validating different objects. Cloning shares the validator instance
/// cache.
#[derive(Clone, Debug)]
pub struct CrossFieldProcessor {
    registry: ValidatorRegistry,
}

impl CrossFieldProcessor {
    /// Create a new processor with an empty validator instance cache
    pub fn new() -> Self {
        Self {
            registry: ValidatorRegistry::new(),
        }
    }

    /// The validator registry backing this processor
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Run one validation pass over `obj` and return the outcome.
    ///
    /// Walks the object's fields in declaration order and each field's
    /// markers in attachment order. Markers without a validator binding
    /// are skipped. A panicking validator is caught here, logged, counted
    /// as a failed constraint, and evaluation continues with the next
    /// marker. Only configuration errors abort the pass.
    pub fn check<T: CrossFieldSchema>(&self, obj: &T) -> Result<ValidationOutcome, Error> {
        let fields = fields_of::<T>();
        let layout = FieldLayout::new(&fields);
        let source: &dyn FieldSource = obj;

        let mut violations = Violations::new();
        let mut valid = true;

        for field in fields.iter() {
            for marker in field.markers() {
                let Some(validator) = self.registry.resolve(marker.as_any().type_id())? else {
                    trace!(
                        field = field.name(),
                        marker = marker.marker_name(),
                        "Marker has no validator binding, skipping"
                    );
                    continue;
                };

                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    validator.is_valid(source, &layout, &mut violations)
                }));

                match result {
                    Ok(result) => valid &= result,
                    Err(_) => {
                        warn!(
                            validator = validator.name(),
                            field = field.name(),
                            "Validator panicked, treating constraint as failed"
                        );
                        valid = false;
                    }
                }
            }
        }

        Ok(ValidationOutcome { valid, violations })
    }

    /// Validate `obj`, reporting violations through the host context.
    ///
    /// On failure the default violation is suppressed and every record is
    /// registered against its field, in collection order; on success the
    /// context is never touched. Returns the aggregate boolean outcome.
    pub fn validate<T: CrossFieldSchema>(
        &self,
        obj: &T,
        context: &mut dyn ConstraintContext,
    ) -> Result<bool, Error> {
        let outcome = self.check(obj)?;

        if !outcome.is_valid() {
            context.disable_default_violation();
            for violation in outcome.violations() {
                context.add_property_violation(&violation.field, &violation.message);
            }
        }

        Ok(outcome.is_valid())
    }
}

impl Default for CrossFieldProcessor {
    fn default() -> Self {
        Self::new()
    }
}
