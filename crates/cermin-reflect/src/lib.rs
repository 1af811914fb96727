//! Cermin Reflection Engine
//!
//! Cermin layers a memoizing reflection facade over explicitly registered
//! type metadata. The consuming application declares its classes once
//! (`registry` module), then asks a [`Reflector`] for descriptors:
//! - **Classes**: name, ancestry, members, with one cached handle per type
//!   name (`class` module)
//! - **Objects**: per-instance descriptors keyed by stable instance
//!   identity
//! - **Fields**: listing across the ancestor chain and visibility-bypassing
//!   reads and writes (`member` module)
//! - **Callables**: human-readable rendering of closures, methods, and
//!   functions (`callable` module)
//! - **Annotations**: attached metadata fetched through an injected reader
//!   (`annotation` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use cermin_reflect::{ClassDef, FieldDef, Reflector, TypeRegistry, Visibility};
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     ClassDef::new("Point")
//!         .field(FieldDef::new("x", Visibility::Private).declared_type("Float")),
//! );
//!
//! let reflector = Reflector::new(registry);
//! let class = reflector.load_class("Point")?;
//! assert_eq!(class.name(), "Point");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

use thiserror::Error;

pub mod annotation;
pub mod callable;
pub mod class;
pub mod member;
pub mod reflector;
pub mod registry;

pub use annotation::{Annotation, AnnotationHandle, AnnotationReader, AnnotationTable};
pub use callable::{describe_callable, CallableDescriptor, SourceLocation};
pub use class::{ClassDescriptor, ObjectDescriptor};
pub use member::{
    FieldDescriptor, FieldGetter, FieldSetter, MethodDescriptor, ParameterSpec, Visibility,
    VisibilityFilter,
};
pub use reflector::{CacheSections, Reflector, Subject};
pub use registry::{ClassDef, FieldDef, MethodDef, TypeRegistry};

pub use cermin_core::{
    AccessError, FromValue, InstanceId, IntoValue, ObjectRef, Reflectable, Value, ValueKind,
};

/// Errors produced by reflection operations.
#[derive(Debug, Clone, Error)]
pub enum ReflectError {
    /// A non-object value was handed to an object-descriptor lookup
    #[error("Expected an object, {kind} given")]
    NotAnObject {
        /// Kind of the value actually received
        kind: ValueKind,
    },

    /// No registration exists for the requested class name
    #[error("Class `{0}` is not registered")]
    ClassNotFound(String),

    /// The resolved class declares no method of the requested name
    #[error("Method `{class}::{method}` does not exist")]
    MethodNotFound {
        /// Class the lookup resolved to
        class: String,
        /// Requested method name
        method: String,
    },

    /// The resolved class declares no field of the requested name
    #[error("Field `{class}::{field}` does not exist")]
    FieldNotFound {
        /// Class the lookup resolved to
        class: String,
        /// Requested field name
        field: String,
    },

    /// An instance field was addressed through a type-name subject
    #[error("Field `{class}::{field}` is not static and requires an instance")]
    InstanceRequired {
        /// Class the lookup resolved to
        class: String,
        /// Requested field name
        field: String,
    },

    /// A class's `extends` chain loops back on itself
    #[error("Cyclic ancestry detected at class `{0}`")]
    CyclicAncestry(String),

    /// A registered accessor rejected the operation
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Convenience alias for reflection results.
pub type ReflectResult<T> = Result<T, ReflectError>;
