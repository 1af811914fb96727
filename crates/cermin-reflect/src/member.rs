//! Field and method descriptors
//!
//! Member descriptors are the per-field and per-method handles hanging off
//! a [`ClassDescriptor`](crate::class::ClassDescriptor). Field descriptors
//! additionally carry the registered accessor closures, which operate on
//! the live instance and ignore the recorded visibility (visibility is
//! filter metadata, never an access check).

use std::sync::Arc;

use cermin_core::{AccessError, Reflectable, Value};

use crate::callable::CallableDescriptor;

// ============================================================================
// Visibility
// ============================================================================

/// Declared visibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Public member
    Public,
    /// Protected member
    Protected,
    /// Private member
    Private,
}

impl Visibility {
    /// Bit used by [`VisibilityFilter`] masks.
    pub const fn bit(self) -> u8 {
        match self {
            Visibility::Public => 1,
            Visibility::Protected => 2,
            Visibility::Private => 4,
        }
    }

    /// Lowercase name ("public", "protected", "private")
    pub const fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bitmask selecting which visibilities a field listing includes.
///
/// Combine with `|`; the default mask matches all three visibilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityFilter(u8);

impl VisibilityFilter {
    /// Match public fields
    pub const PUBLIC: VisibilityFilter = VisibilityFilter(1);
    /// Match protected fields
    pub const PROTECTED: VisibilityFilter = VisibilityFilter(2);
    /// Match private fields
    pub const PRIVATE: VisibilityFilter = VisibilityFilter(4);
    /// Match every visibility
    pub const ALL: VisibilityFilter = VisibilityFilter(7);

    /// Build a filter from a raw bit pattern (unknown bits are kept but
    /// never match anything).
    pub const fn from_bits(bits: u8) -> Self {
        VisibilityFilter(bits)
    }

    /// Raw bit pattern
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether a member of the given visibility passes this filter
    pub const fn matches(self, visibility: Visibility) -> bool {
        self.0 & visibility.bit() != 0
    }
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        VisibilityFilter::ALL
    }
}

impl std::ops::BitOr for VisibilityFilter {
    type Output = VisibilityFilter;

    fn bitor(self, rhs: VisibilityFilter) -> VisibilityFilter {
        VisibilityFilter(self.0 | rhs.0)
    }
}

// ============================================================================
// Field Descriptor
// ============================================================================

/// Registered getter: reads one field off a live instance.
pub type FieldGetter =
    Arc<dyn Fn(&dyn Reflectable) -> Result<Value, AccessError> + Send + Sync>;

/// Registered setter: writes one field on a live instance.
pub type FieldSetter =
    Arc<dyn Fn(&mut dyn Reflectable, Value) -> Result<(), AccessError> + Send + Sync>;

/// Descriptor for one declared field of a class.
///
/// Carries the metadata recorded at registration plus the accessor
/// capability. Static fields point into the declaring class's shared slot
/// storage instead of carrying instance accessors.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) declaring_class: String,
    pub(crate) declared_type: Option<String>,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_readonly: bool,
    pub(crate) static_slot: Option<usize>,
    pub(crate) getter: Option<FieldGetter>,
    pub(crate) setter: Option<FieldSetter>,
}

impl FieldDescriptor {
    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the class that declares this field
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Declared type label, if one was registered
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    /// Declared visibility
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether this is a static field (stored on the type)
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether this field was registered as readonly (metadata only)
    pub const fn is_readonly(&self) -> bool {
        self.is_readonly
    }

    /// Whether instance accessors were registered for this field
    pub fn has_accessors(&self) -> bool {
        self.getter.is_some() && self.setter.is_some()
    }

    /// Run the registered getter against a live instance.
    pub(crate) fn read_from(&self, target: &dyn Reflectable) -> Result<Value, AccessError> {
        let get = self.getter.as_ref().ok_or(AccessError::NoAccessor)?;
        (**get)(target)
    }

    /// Run the registered setter against a live instance.
    pub(crate) fn write_to(
        &self,
        target: &mut dyn Reflectable,
        value: Value,
    ) -> Result<(), AccessError> {
        let set = self.setter.as_ref().ok_or(AccessError::NoAccessor)?;
        (**set)(target, value)
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("declaring_class", &self.declaring_class)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("is_readonly", &self.is_readonly)
            .finish()
    }
}

// ============================================================================
// Method Descriptor
// ============================================================================

/// One declared parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,
    /// Declared type label, if any
    pub type_name: Option<String>,
}

impl ParameterSpec {
    /// Untyped parameter
    pub fn new(name: impl Into<String>) -> Self {
        ParameterSpec {
            name: name.into(),
            type_name: None,
        }
    }

    /// Parameter with a declared type label
    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        ParameterSpec {
            name: name.into(),
            type_name: Some(type_name.into()),
        }
    }
}

/// Descriptor for one declared method of a class.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub(crate) name: String,
    pub(crate) declaring_class: String,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_abstract: bool,
    pub(crate) params: Vec<ParameterSpec>,
}

impl MethodDescriptor {
    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the class that declares this method
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Declared visibility
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether this is a static method
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether this method is abstract
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Declared parameters, in order
    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// Bound-method callable descriptor (`Class::method` when described)
    pub fn as_callable(&self) -> CallableDescriptor {
        CallableDescriptor::method(self.declaring_class.clone(), self.name.clone())
    }
}
