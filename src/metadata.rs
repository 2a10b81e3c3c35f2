//! Field metadata - constraint markers, field descriptors, and the
//! per-type discovery cache.
//!
//! A validated type declares its field layout once through
//! [`CrossFieldSchema::fields`]; the engine caches the result per type and
//! reuses it for every subsequent validation pass.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// A declarative, data-only description of one constraint occurrence.
///
/// Markers are attached to fields at declaration time and are immutable.
/// A marker on its own does nothing; it only takes effect when a validator
/// is bound to its type (see `register_validator!`). Markers without a
/// binding are inert and simply skipped.
pub trait ConstraintMarker: Any + Send + Sync + std::fmt::Debug {
    /// Downcasting access for validators that read marker data
    fn as_any(&self) -> &dyn Any;

    /// Marker type name, for logging and diagnostics
    fn marker_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A declared field: its name and the constraint markers attached to it.
#[derive(Debug)]
pub struct FieldDescriptor {
    name: &'static str,
    markers: Vec<Box<dyn ConstraintMarker>>,
}

impl FieldDescriptor {
    /// Describe a field with no attached markers
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            markers: Vec::new(),
        }
    }

    /// Attach a constraint marker to this field
    pub fn with_marker(mut self, marker: impl ConstraintMarker) -> Self {
        self.markers.push(Box::new(marker));
        self
    }

    /// The declared field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All markers attached to this field, in attachment order
    pub fn markers(&self) -> &[Box<dyn ConstraintMarker>] {
        &self.markers
    }

    /// Get the first attached marker of type `M`, if any
    pub fn marker<M: ConstraintMarker>(&self) -> Option<&M> {
        self.markers
            .iter()
            .find_map(|marker| marker.as_any().downcast_ref::<M>())
    }

    /// Check whether a marker of type `M` is attached
    pub fn has_marker<M: ConstraintMarker>(&self) -> bool {
        self.marker::<M>().is_some()
    }
}

/// Borrowed view of a type's full field layout.
///
/// Passed to every validator invocation so constraint logic can locate
/// arbitrary sibling fields by name rather than just the annotated one.
#[derive(Debug, Clone, Copy)]
pub struct FieldLayout<'a> {
    fields: &'a [FieldDescriptor],
}

impl<'a> FieldLayout<'a> {
    /// Wrap a field descriptor slice
    pub fn new(fields: &'a [FieldDescriptor]) -> Self {
        Self { fields }
    }

    /// All field descriptors in declaration order
    pub fn fields(&self) -> &'a [FieldDescriptor] {
        self.fields
    }

    /// Look up a field descriptor by name
    pub fn field(&self, name: &str) -> Option<&'a FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Iterate the fields carrying a marker of type `M`, with the marker
    pub fn annotated<M: ConstraintMarker>(
        &self,
    ) -> impl Iterator<Item = (&'a FieldDescriptor, &'a M)> {
        self.fields
            .iter()
            .filter_map(|field| field.marker::<M>().map(|marker| (field, marker)))
    }

    /// Apply `action` to each field carrying a marker of type `M`
    pub fn for_each_annotated<M: ConstraintMarker>(
        &self,
        mut action: impl FnMut(&FieldDescriptor, &M),
    ) {
        for (field, marker) in self.annotated::<M>() {
            action(field, marker);
        }
    }
}

/// The "describe type" capability a validated type implements.
///
/// `fields` declares the type's field layout with its attached markers;
/// the engine calls it once per type and caches the result. `field_value`
/// is the bean-style property read: it returns `None` for unknown fields,
/// never an error.
pub trait CrossFieldSchema: 'static {
    /// Field layout in declaration order, with attached markers
    fn fields() -> Vec<FieldDescriptor>;

    /// Read a named field as a JSON value; `None` for unknown fields
    fn field_value(&self, field: &str) -> Option<Value>;
}

/// Adapt any serializable field into the engine's field-value
/// representation. Values that fail to serialize read as null.
pub fn to_field_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

static FIELD_CACHE: Lazy<RwLock<HashMap<TypeId, Arc<[FieldDescriptor]>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Get the cached field layout for `T`, discovering it on first use.
///
/// Discovery runs at most once per type for the lifetime of the process;
/// concurrent first-time calls for the same type insert a single entry.
pub fn fields_of<T: CrossFieldSchema>() -> Arc<[FieldDescriptor]> {
    let type_id = TypeId::of::<T>();

    if let Some(fields) = FIELD_CACHE.read().unwrap().get(&type_id) {
        return fields.clone();
    }

    let mut cache = FIELD_CACHE.write().unwrap();
    cache
        .entry(type_id)
        .or_insert_with(|| {
            let fields: Arc<[FieldDescriptor]> = T::fields().into();
            debug!(
                validated_type = std::any::type_name::<T>(),
                field_count = fields.len(),
                "Discovered field layout"
            );
            fields
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct RequiredWith {
        target: &'static str,
    }

    impl ConstraintMarker for RequiredWith {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct OtherMarker;

    impl ConstraintMarker for OtherMarker {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_marker_downcast() {
        let field = FieldDescriptor::new("city").with_marker(RequiredWith { target: "zip" });

        let marker = field.marker::<RequiredWith>().unwrap();
        assert_eq!(marker.target, "zip");
        assert!(field.marker::<OtherMarker>().is_none());
        assert!(field.has_marker::<RequiredWith>());
    }

    #[test]
    fn test_markers_keep_attachment_order() {
        let field = FieldDescriptor::new("city")
            .with_marker(OtherMarker)
            .with_marker(RequiredWith { target: "zip" });
        assert_eq!(field.markers().len(), 2);
        assert_eq!(field.markers()[0].marker_name(), std::any::type_name::<OtherMarker>());
    }

    #[test]
    fn test_layout_lookup() {
        let fields = vec![
            FieldDescriptor::new("zip"),
            FieldDescriptor::new("city").with_marker(RequiredWith { target: "zip" }),
        ];
        let layout = FieldLayout::new(&fields);

        assert_eq!(layout.field("zip").unwrap().name(), "zip");
        assert!(layout.field("country").is_none());

        let annotated: Vec<&str> = layout
            .annotated::<RequiredWith>()
            .map(|(field, _)| field.name())
            .collect();
        assert_eq!(annotated, vec!["city"]);
    }

    #[test]
    fn test_for_each_annotated_visits_only_carriers() {
        let fields = vec![
            FieldDescriptor::new("a").with_marker(RequiredWith { target: "b" }),
            FieldDescriptor::new("b"),
            FieldDescriptor::new("c").with_marker(RequiredWith { target: "a" }),
        ];
        let layout = FieldLayout::new(&fields);

        let mut visited = Vec::new();
        layout.for_each_annotated::<RequiredWith>(|field, marker| {
            visited.push((field.name(), marker.target));
        });
        assert_eq!(visited, vec![("a", "b"), ("c", "a")]);
    }

    struct CountedType;

    static COUNTED_DISCOVERIES: AtomicUsize = AtomicUsize::new(0);

    impl CrossFieldSchema for CountedType {
        fn fields() -> Vec<FieldDescriptor> {
            COUNTED_DISCOVERIES.fetch_add(1, Ordering::SeqCst);
            vec![FieldDescriptor::new("first"), FieldDescriptor::new("second")]
        }

        fn field_value(&self, _field: &str) -> Option<Value> {
            None
        }
    }

    #[test]
    fn test_fields_of_discovers_once() {
        let first = fields_of::<CountedType>();
        let second = fields_of::<CountedType>();

        assert_eq!(COUNTED_DISCOVERIES.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));

        let names: Vec<&str> = first.iter().map(|field| field.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    struct EmptyType;

    impl CrossFieldSchema for EmptyType {
        fn fields() -> Vec<FieldDescriptor> {
            Vec::new()
        }

        fn field_value(&self, _field: &str) -> Option<Value> {
            None
        }
    }

    #[test]
    fn test_zero_fields_is_valid() {
        let fields = fields_of::<EmptyType>();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_to_field_value() {
        assert_eq!(to_field_value(&"abc"), Value::String("abc".to_string()));
        assert_eq!(to_field_value(&42), Value::from(42));
        assert_eq!(to_field_value(&Option::<String>::None), Value::Null);
    }
}
