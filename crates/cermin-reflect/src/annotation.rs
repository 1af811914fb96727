//! Annotation records and readers
//!
//! Annotations are plain Rust values attached to classes by an external
//! collaborator. The facade never reads metadata itself; callers pass an
//! [`AnnotationReader`] per call. An annotation's *kind* is its concrete
//! Rust type, and ancestor merges de-duplicate by kind.
//!
//! [`AnnotationTable`] is the bundled reader implementation: annotations
//! registered per class name, mirroring how the type tables themselves are
//! populated.

use std::any::{Any, TypeId};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::class::ClassDescriptor;

/// Marker trait for annotation values.
///
/// Any `'static + Send + Sync + Debug` type qualifies; implementations
/// only forward to `Any` so records can be downcast back to their concrete
/// kind.
pub trait Annotation: Any + Send + Sync + std::fmt::Debug {
    /// Upcast to `Any` for kind checks and downcasting
    fn as_any(&self) -> &dyn Any;
}

impl dyn Annotation {
    /// Concrete kind of this record
    pub fn kind(&self) -> TypeId {
        self.as_any().type_id()
    }

    /// Whether this record is of kind `A`
    pub fn is<A: Annotation>(&self) -> bool {
        self.kind() == TypeId::of::<A>()
    }

    /// Downcast to the concrete kind
    pub fn downcast_ref<A: Annotation>(&self) -> Option<&A> {
        self.as_any().downcast_ref::<A>()
    }
}

/// Shared handle to one annotation record.
pub type AnnotationHandle = Arc<dyn Annotation>;

/// Capability interface for fetching the annotations declared directly on
/// a class.
///
/// Implementations must not walk ancestors; the facade does that itself
/// when asked to merge.
pub trait AnnotationReader {
    /// Annotations declared directly on `class`, in declaration order
    fn class_annotations(&self, class: &ClassDescriptor) -> Vec<AnnotationHandle>;
}

/// Table-backed [`AnnotationReader`]: annotations registered per class
/// name by the consuming application.
#[derive(Debug, Default)]
pub struct AnnotationTable {
    by_class: FxHashMap<String, Vec<AnnotationHandle>>,
}

impl AnnotationTable {
    /// Create an empty table
    pub fn new() -> Self {
        AnnotationTable {
            by_class: FxHashMap::default(),
        }
    }

    /// Attach an annotation to a class name.
    pub fn annotate<A: Annotation>(&mut self, class_name: impl Into<String>, annotation: A) {
        self.by_class
            .entry(class_name.into())
            .or_default()
            .push(Arc::new(annotation));
    }

    /// Annotations registered for a class name, in registration order
    pub fn annotations_of(&self, class_name: &str) -> &[AnnotationHandle] {
        self.by_class
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl AnnotationReader for AnnotationTable {
    fn class_annotations(&self, class: &ClassDescriptor) -> Vec<AnnotationHandle> {
        self.annotations_of(class.name()).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Route {
        path: String,
    }

    impl Annotation for Route {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Deprecated;

    impl Annotation for Deprecated {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_kind_discriminates_concrete_types() {
        let route: AnnotationHandle = Arc::new(Route {
            path: "/users".to_string(),
        });
        let deprecated: AnnotationHandle = Arc::new(Deprecated);

        assert_ne!(route.kind(), deprecated.kind());
        assert!(route.is::<Route>());
        assert!(!route.is::<Deprecated>());
    }

    #[test]
    fn test_downcast() {
        let handle: AnnotationHandle = Arc::new(Route {
            path: "/users".to_string(),
        });

        let route = handle.downcast_ref::<Route>().unwrap();
        assert_eq!(route.path, "/users");
        assert!(handle.downcast_ref::<Deprecated>().is_none());
    }

    #[test]
    fn test_table_registration_order() {
        let mut table = AnnotationTable::new();
        table.annotate("Controller", Route {
            path: "/a".to_string(),
        });
        table.annotate("Controller", Deprecated);

        let records = table.annotations_of("Controller");
        assert_eq!(records.len(), 2);
        assert!(records[0].is::<Route>());
        assert!(records[1].is::<Deprecated>());
        assert!(table.annotations_of("Unknown").is_empty());
    }
}
