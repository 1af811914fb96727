//! Registered type-metadata tables
//!
//! Rust has no runtime introspection, so the consuming application
//! declares its types up front: a [`ClassDef`] per class, built from
//! [`FieldDef`]s and [`MethodDef`]s, registered with a [`TypeRegistry`].
//! The registry is the source of truth the reflection facade materializes
//! descriptors from; it owns the static-field slot storage so type state
//! outlives any descriptor cache.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use cermin_core::{AccessError, Reflectable, Value};

use crate::member::{FieldGetter, FieldSetter, ParameterSpec, Visibility};

// ============================================================================
// Field Definition
// ============================================================================

/// Definition of one field, registered as part of a [`ClassDef`].
#[derive(Clone)]
pub struct FieldDef {
    pub(crate) name: String,
    pub(crate) declared_type: Option<String>,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_readonly: bool,
    pub(crate) initial: Option<Value>,
    pub(crate) getter: Option<FieldGetter>,
    pub(crate) setter: Option<FieldSetter>,
}

impl FieldDef {
    /// Create an instance-field definition.
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        FieldDef {
            name: name.into(),
            declared_type: None,
            visibility,
            is_static: false,
            is_readonly: false,
            initial: None,
            getter: None,
            setter: None,
        }
    }

    /// Record a declared type label
    pub fn declared_type(mut self, type_name: impl Into<String>) -> Self {
        self.declared_type = Some(type_name.into());
        self
    }

    /// Set the initial value (static fields; the slot starts as null
    /// otherwise)
    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Mark as static field
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as readonly (recorded as metadata, not enforced)
    pub fn as_readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    /// Register typed accessors for this field.
    ///
    /// The closures see the concrete type; the wrappers downcast from
    /// `dyn Reflectable` and report a type mismatch when the field is
    /// addressed through an instance of a different class.
    pub fn with_accessors<T, G, S>(mut self, get: G, set: S) -> Self
    where
        T: Reflectable,
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<(), AccessError> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(move |target: &dyn Reflectable| {
            match target.as_any().downcast_ref::<T>() {
                Some(typed) => Ok(get(typed)),
                None => Err(AccessError::TypeMismatch {
                    expected: std::any::type_name::<T>().to_string(),
                    got: target.class_name().to_string(),
                }),
            }
        }));
        self.setter = Some(Arc::new(
            move |target: &mut dyn Reflectable, value: Value| {
                let class_name = target.class_name();
                match target.as_any_mut().downcast_mut::<T>() {
                    Some(typed) => set(typed, value),
                    None => Err(AccessError::TypeMismatch {
                        expected: std::any::type_name::<T>().to_string(),
                        got: class_name.to_string(),
                    }),
                }
            },
        ));
        self
    }
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("is_readonly", &self.is_readonly)
            .field("has_accessors", &(self.getter.is_some() && self.setter.is_some()))
            .finish()
    }
}

// ============================================================================
// Method Definition
// ============================================================================

/// Definition of one method, registered as part of a [`ClassDef`].
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub(crate) name: String,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) is_abstract: bool,
    pub(crate) params: Vec<ParameterSpec>,
}

impl MethodDef {
    /// Create a method definition.
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        MethodDef {
            name: name.into(),
            visibility,
            is_static: false,
            is_abstract: false,
            params: Vec::new(),
        }
    }

    /// Mark as static method
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as abstract method
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Append a declared parameter
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }
}

// ============================================================================
// Class Definition
// ============================================================================

/// Definition of one class: name, optional parent, members.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) methods: Vec<MethodDef>,
}

impl ClassDef {
    /// Create a class definition.
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Declare the parent class by name
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Append a field definition
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a method definition
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class name, if declared
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

// ============================================================================
// Type Registry
// ============================================================================

/// One registration: the definition plus the static-field slot storage
/// allocated for it.
#[derive(Debug)]
pub(crate) struct ClassRecord {
    pub(crate) def: ClassDef,
    pub(crate) statics: Arc<RwLock<Vec<Value>>>,
}

/// Registry of class definitions, looked up by name.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    records: Vec<ClassRecord>,
    name_to_id: FxHashMap<String, usize>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        TypeRegistry {
            records: Vec::new(),
            name_to_id: FxHashMap::default(),
        }
    }

    /// Register a class definition and return its id.
    ///
    /// Registering a name again replaces the earlier definition for future
    /// lookups and allocates fresh static slots; descriptors already
    /// materialized keep serving the old definition until the facade's
    /// cache is cleared.
    pub fn register(&mut self, def: ClassDef) -> usize {
        let statics: Vec<Value> = def
            .fields
            .iter()
            .filter(|field| field.is_static)
            .map(|field| field.initial.clone().unwrap_or(Value::Null))
            .collect();

        let id = self.records.len();
        self.name_to_id.insert(def.name.clone(), id);
        self.records.push(ClassRecord {
            def,
            statics: Arc::new(RwLock::new(statics)),
        });
        id
    }

    /// Whether a class name is registered
    pub fn has_class(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    /// Number of registrations (replaced definitions included)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over registered definitions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ClassDef> {
        self.records.iter().map(|record| &record.def)
    }

    /// Current record for a name (latest registration wins)
    pub(crate) fn record(&self, name: &str) -> Option<&ClassRecord> {
        self.name_to_id.get(name).map(|&id| &self.records[id])
    }
}
