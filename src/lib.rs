//! Cross-field validation for Rust structs
//!
//! Single-field validation frameworks check one value at a time and
//! cannot see sibling fields. This crate dispatches constraints that span
//! multiple fields of one object: a type declares its field layout and
//! attaches constraint markers, validators are bound to marker types at
//! load time, and one validation pass evaluates every marker on every
//! field before reporting.
//!
//! Field layouts are discovered once per type and cached; validator
//! instances are constructed once per marker type and shared across all
//! passes and threads.
//!
//! # Examples
//!
//! ## Matching Fields
//!
//! ```
//! use crossfield::{
//!     to_field_value, CrossFieldProcessor, CrossFieldSchema, FieldDescriptor, MatchWith,
//! };
//! use serde_json::Value;
//!
//! struct SignupForm {
//!     password: String,
//!     confirm_password: String,
//! }
//!
//! impl CrossFieldSchema for SignupForm {
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             FieldDescriptor::new("password"),
//!             FieldDescriptor::new("confirm_password")
//!                 .with_marker(MatchWith::new("password")),
//!         ]
//!     }
//!
//!     fn field_value(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "password" => Some(to_field_value(&self.password)),
//!             "confirm_password" => Some(to_field_value(&self.confirm_password)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let processor = CrossFieldProcessor::new();
//!
//! let form = SignupForm {
//!     password: "hunter2".to_string(),
//!     confirm_password: "hunter2".to_string(),
//! };
//! assert!(processor.check(&form).unwrap().is_valid());
//!
//! let form = SignupForm {
//!     password: "hunter2".to_string(),
//!     confirm_password: "different".to_string(),
//! };
//! let outcome = processor.check(&form).unwrap();
//! assert!(!outcome.is_valid());
//! assert_eq!(outcome.violations().as_slice()[0].field, "confirm_password");
//! ```
//!
//! ## Custom Constraints
//!
//! Declare a marker, implement a validator, and bind them with
//! [`register_validator!`](crate::register_validator). Markers without a
//! binding are inert, so unrelated annotations can coexist on the same
//! fields.
//!
//! ```
//! use crossfield::{
//!     get_field_value, to_field_value, ConstraintMarker, CrossFieldProcessor,
//!     CrossFieldSchema, CrossFieldValidator, FieldDescriptor, FieldLayout, FieldSource,
//!     Violations,
//! };
//! use serde_json::Value;
//! use std::any::Any;
//!
//! /// The annotated field may not equal the target field.
//! #[derive(Debug)]
//! struct DiffersFrom {
//!     field: &'static str,
//! }
//!
//! impl ConstraintMarker for DiffersFrom {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct DiffersFromValidator;
//!
//! impl CrossFieldValidator for DiffersFromValidator {
//!     fn is_valid(
//!         &self,
//!         obj: &dyn FieldSource,
//!         layout: &FieldLayout<'_>,
//!         violations: &mut Violations,
//!     ) -> bool {
//!         let before = violations.len();
//!         layout.for_each_annotated::<DiffersFrom>(|field, marker| {
//!             let value = get_field_value(obj, field.name());
//!             let other = get_field_value(obj, marker.field);
//!             if value.is_some() && value == other {
//!                 violations.add(field.name(), "Fields must differ.");
//!             }
//!         });
//!         violations.len() == before
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "DiffersFromValidator"
//!     }
//! }
//!
//! crossfield::register_validator!(DiffersFrom, DiffersFromValidator);
//!
//! struct Account {
//!     username: String,
//!     password: String,
//! }
//!
//! impl CrossFieldSchema for Account {
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             FieldDescriptor::new("username"),
//!             FieldDescriptor::new("password").with_marker(DiffersFrom { field: "username" }),
//!         ]
//!     }
//!
//!     fn field_value(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "username" => Some(to_field_value(&self.username)),
//!             "password" => Some(to_field_value(&self.password)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! fn main() {
//!     let processor = CrossFieldProcessor::new();
//!
//!     let account = Account {
//!         username: "admin".to_string(),
//!         password: "admin".to_string(),
//!     };
//!     assert!(!processor.check(&account).unwrap().is_valid());
//! }
//! ```

mod errors;
mod metadata;
mod processor;
mod registry;
mod traits;
mod validators;

pub use errors::*;
pub use metadata::*;
pub use processor::*;
pub use registry::*;
pub use traits::*;
pub use validators::*;
