//! Validator registry - load-time marker-to-validator bindings and the
//! shared validator instance cache.
//!
//! Bindings are declared with [`register_validator!`](crate::register_validator)
//! and collected through `inventory` when the program loads; no runtime
//! registration API exists. Validator instances are constructed lazily,
//! at most once per marker type, and shared across all validation passes.

use crate::errors::Error;
use crate::metadata::ConstraintMarker;
use crate::traits::CrossFieldValidator;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace, warn};

/// Constructor stored in a binding; returns the validator or a reason the
/// configuration is unusable
pub type ValidatorConstructor = fn() -> Result<Box<dyn CrossFieldValidator>, String>;

/// A marker-to-validator binding that can be collected via inventory
pub struct ValidatorBinding {
    /// The type ID of the marker this binding interprets
    marker_type_id: TypeId,
    /// The marker type name (for diagnostics)
    pub marker_type_name: fn() -> &'static str,
    /// Validator constructor, run at most once per registry
    constructor: ValidatorConstructor,
}

// Register ValidatorBinding with inventory for load-time collection
inventory::collect!(ValidatorBinding);

impl ValidatorBinding {
    /// Create a new binding for marker type `M`
    pub const fn new<M: ConstraintMarker>(constructor: ValidatorConstructor) -> Self {
        Self {
            marker_type_id: TypeId::of::<M>(),
            marker_type_name: std::any::type_name::<M>,
            constructor,
        }
    }

    /// The marker type this binding interprets
    pub fn marker_type_id(&self) -> TypeId {
        self.marker_type_id
    }
}

/// Register a validator for a constraint marker type.
///
/// The `(Marker, ValidatorType)` form constructs the validator through
/// `Default`. The closure form supports fallible construction and must
/// return `Result<Box<dyn CrossFieldValidator>, String>`; a returned
/// error surfaces as a fatal configuration error on first resolution.
///
/// Exactly one validator is bound per marker type; duplicate
/// registrations keep the first one seen and log a warning.
#[macro_export]
macro_rules! register_validator {
    ($marker:ty, $validator:ty) => {
        $crate::register_validator!($marker, || {
            Ok(Box::new(<$validator as ::std::default::Default>::default())
                as Box<dyn $crate::CrossFieldValidator>)
        });
    };
    ($marker:ty, $constructor:expr) => {
        inventory::submit! {
            $crate::ValidatorBinding::new::<$marker>($constructor)
        }
    };
}

/// Binding index built once from the inventory, keyed by marker type
static BINDINGS: Lazy<HashMap<TypeId, &'static ValidatorBinding>> = Lazy::new(|| {
    let mut bindings: HashMap<TypeId, &'static ValidatorBinding> = HashMap::new();

    for binding in inventory::iter::<ValidatorBinding> {
        match bindings.entry(binding.marker_type_id) {
            Entry::Vacant(entry) => {
                trace!(marker = (binding.marker_type_name)(), "Collected validator binding");
                entry.insert(binding);
            }
            Entry::Occupied(_) => {
                warn!(
                    marker = (binding.marker_type_name)(),
                    "Duplicate validator binding, keeping the first registration"
                );
            }
        }
    }

    debug!(binding_count = bindings.len(), "Validator bindings indexed");
    bindings
});

/// Registry of validator instances, keyed by marker type.
///
/// Cloning shares the underlying instance cache.
#[derive(Clone)]
pub struct ValidatorRegistry {
    instances: Arc<RwLock<HashMap<TypeId, Arc<dyn CrossFieldValidator>>>>,
}

impl ValidatorRegistry {
    /// Create a new registry with an empty instance cache
    pub fn new() -> Self {
        Self {
            instances: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve the validator bound to a marker type.
    ///
    /// Marker types without a binding resolve to `Ok(None)` without ever
    /// entering the construction path; such markers are inert. Bound
    /// marker types are constructed exactly once per registry and the
    /// shared instance is returned thereafter. Construction failure is a
    /// fatal configuration error identifying the offending marker type.
    pub fn resolve(
        &self,
        marker_type: TypeId,
    ) -> Result<Option<Arc<dyn CrossFieldValidator>>, Error> {
        if let Some(validator) = self.instances.read().unwrap().get(&marker_type) {
            return Ok(Some(validator.clone()));
        }

        let Some(binding) = BINDINGS.get(&marker_type) else {
            return Ok(None);
        };

        // Re-check under the exclusive lock so a racing first resolution
        // constructs a single instance.
        let mut instances = self.instances.write().unwrap();
        if let Some(validator) = instances.get(&marker_type) {
            return Ok(Some(validator.clone()));
        }

        trace!(marker = (binding.marker_type_name)(), "Constructing validator");
        let validator = (binding.constructor)().map_err(|reason| {
            Error::ValidatorConstruction(format!(
                "Failed to instantiate validator for {}: {}",
                (binding.marker_type_name)(), reason
            ))
        })?;
        let validator: Arc<dyn CrossFieldValidator> = Arc::from(validator);
        instances.insert(marker_type, validator.clone());

        debug!(
            marker = (binding.marker_type_name)(),
            validator = validator.name(),
            "Validator instance cached"
        );
        Ok(Some(validator))
    }

    /// Check whether a binding exists for a marker type
    pub fn is_bound(&self, marker_type: TypeId) -> bool {
        BINDINGS.contains_key(&marker_type)
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("cached_instances", &self.instances.read().unwrap().len())
            .finish()
    }
}
