//! Class and object descriptors
//!
//! A [`ClassDescriptor`] is the materialized handle for one registered
//! type: own-declared members indexed by name, a shared parent link, and
//! the type's static-field slots. Descriptors are immutable once
//! assembled, except the static slots, which are shared with the registry
//! record so static values survive a cache reset.
//!
//! An [`ObjectDescriptor`] binds one live instance (by identity token) to
//! the descriptor of its concrete class.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use cermin_core::{InstanceId, Value};

use crate::member::{FieldDescriptor, MethodDescriptor};

// ============================================================================
// Class Descriptor
// ============================================================================

/// Materialized descriptor for one registered class.
#[derive(Debug)]
pub struct ClassDescriptor {
    name: String,
    parent: Option<Arc<ClassDescriptor>>,
    fields: Vec<Arc<FieldDescriptor>>,
    field_indices: FxHashMap<String, usize>,
    methods: Vec<Arc<MethodDescriptor>>,
    method_indices: FxHashMap<String, usize>,
    statics: Arc<RwLock<Vec<Value>>>,
}

impl ClassDescriptor {
    /// Assemble a descriptor from materialized members.
    ///
    /// `statics` is the slot storage owned by the registry record, shared
    /// so every materialization of the same registration sees the same
    /// static values.
    pub(crate) fn assemble(
        name: String,
        parent: Option<Arc<ClassDescriptor>>,
        fields: Vec<FieldDescriptor>,
        methods: Vec<MethodDescriptor>,
        statics: Arc<RwLock<Vec<Value>>>,
    ) -> Self {
        let mut field_indices =
            FxHashMap::with_capacity_and_hasher(fields.len(), Default::default());
        for (index, field) in fields.iter().enumerate() {
            field_indices.insert(field.name.clone(), index);
        }

        let mut method_indices =
            FxHashMap::with_capacity_and_hasher(methods.len(), Default::default());
        for (index, method) in methods.iter().enumerate() {
            method_indices.insert(method.name.clone(), index);
        }

        ClassDescriptor {
            name,
            parent,
            fields: fields.into_iter().map(Arc::new).collect(),
            field_indices,
            methods: methods.into_iter().map(Arc::new).collect(),
            method_indices,
            statics,
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class descriptor, if this class extends one
    pub fn parent(&self) -> Option<&Arc<ClassDescriptor>> {
        self.parent.as_ref()
    }

    /// The ancestor chain starting at this class and ending at the root.
    pub fn hierarchy(&self) -> Vec<&ClassDescriptor> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(class) = current {
            chain.push(class);
            current = class.parent.as_deref();
        }
        chain
    }

    /// Whether `ancestor` appears strictly above this class in the chain.
    pub fn is_subclass_of(&self, ancestor: &str) -> bool {
        let mut current = self.parent.as_deref();
        while let Some(class) = current {
            if class.name == ancestor {
                return true;
            }
            current = class.parent.as_deref();
        }
        false
    }

    /// Fields declared directly on this class, in declaration order
    pub fn own_fields(&self) -> &[Arc<FieldDescriptor>] {
        &self.fields
    }

    /// Look up an own-declared field by name (ancestors are not searched)
    pub fn field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.field_indices.get(name).map(|&index| &self.fields[index])
    }

    /// Whether a field is declared directly on this class
    pub fn has_field(&self, name: &str) -> bool {
        self.field_indices.contains_key(name)
    }

    /// Methods declared directly on this class, in declaration order
    pub fn own_methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.methods
    }

    /// Look up a method by name, walking the ancestor chain
    /// most-derived-first (inherited methods are found).
    pub fn method(&self, name: &str) -> Option<&Arc<MethodDescriptor>> {
        self.hierarchy()
            .into_iter()
            .find_map(|class| class.method_indices.get(name).map(|&index| &class.methods[index]))
    }

    /// Snapshot of a static field's current value (own-declared only)
    pub fn static_value(&self, name: &str) -> Option<Value> {
        let field = self.field(name)?;
        let slot = field.static_slot?;
        self.statics.read().get(slot).cloned()
    }

    /// Overwrite a static field's slot. Returns false if `name` is not an
    /// own-declared static field.
    pub(crate) fn set_static_value(&self, name: &str, value: Value) -> bool {
        let slot = match self.field(name).and_then(|field| field.static_slot) {
            Some(slot) => slot,
            None => return false,
        };
        match self.statics.write().get_mut(slot) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Object Descriptor
// ============================================================================

/// Descriptor bound to one live instance.
#[derive(Debug)]
pub struct ObjectDescriptor {
    instance: InstanceId,
    class: Arc<ClassDescriptor>,
}

impl ObjectDescriptor {
    pub(crate) fn new(instance: InstanceId, class: Arc<ClassDescriptor>) -> Self {
        ObjectDescriptor { instance, class }
    }

    /// Identity token of the described instance
    pub const fn instance_id(&self) -> InstanceId {
        self.instance
    }

    /// Descriptor of the instance's concrete class
    pub fn class(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    /// Name of the instance's concrete class
    pub fn class_name(&self) -> &str {
        self.class.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::Visibility;

    fn plain_field(name: &str, class: &str, visibility: Visibility) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            declaring_class: class.to_string(),
            declared_type: None,
            visibility,
            is_static: false,
            is_readonly: false,
            static_slot: None,
            getter: None,
            setter: None,
        }
    }

    fn static_field(name: &str, class: &str, slot: usize) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            declaring_class: class.to_string(),
            declared_type: None,
            visibility: Visibility::Public,
            is_static: true,
            is_readonly: false,
            static_slot: Some(slot),
            getter: None,
            setter: None,
        }
    }

    fn plain_method(name: &str, class: &str) -> MethodDescriptor {
        MethodDescriptor {
            name: name.to_string(),
            declaring_class: class.to_string(),
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            params: Vec::new(),
        }
    }

    fn chain() -> Arc<ClassDescriptor> {
        let base = Arc::new(ClassDescriptor::assemble(
            "Base".to_string(),
            None,
            vec![plain_field("id", "Base", Visibility::Protected)],
            vec![plain_method("describe", "Base")],
            Arc::new(RwLock::new(Vec::new())),
        ));
        Arc::new(ClassDescriptor::assemble(
            "Derived".to_string(),
            Some(base),
            vec![plain_field("label", "Derived", Visibility::Private)],
            vec![plain_method("refresh", "Derived")],
            Arc::new(RwLock::new(Vec::new())),
        ))
    }

    #[test]
    fn test_hierarchy_order() {
        let derived = chain();
        let names: Vec<&str> = derived.hierarchy().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Derived", "Base"]);
    }

    #[test]
    fn test_is_subclass_of() {
        let derived = chain();
        assert!(derived.is_subclass_of("Base"));
        assert!(!derived.is_subclass_of("Derived"));
        assert!(!derived.is_subclass_of("Other"));
    }

    #[test]
    fn test_field_lookup_is_own_only() {
        let derived = chain();
        assert!(derived.has_field("label"));
        assert!(!derived.has_field("id"));
        assert!(derived.parent().unwrap().has_field("id"));
    }

    #[test]
    fn test_method_lookup_walks_chain() {
        let derived = chain();
        let own = derived.method("refresh").unwrap();
        assert_eq!(own.declaring_class(), "Derived");

        let inherited = derived.method("describe").unwrap();
        assert_eq!(inherited.declaring_class(), "Base");

        assert!(derived.method("missing").is_none());
    }

    #[test]
    fn test_static_slots() {
        let class = ClassDescriptor::assemble(
            "Config".to_string(),
            None,
            vec![static_field("version", "Config", 0)],
            Vec::new(),
            Arc::new(RwLock::new(vec![Value::Int(1)])),
        );

        assert_eq!(class.static_value("version"), Some(Value::Int(1)));
        assert!(class.set_static_value("version", Value::Int(2)));
        assert_eq!(class.static_value("version"), Some(Value::Int(2)));
        assert!(!class.set_static_value("missing", Value::Null));
    }
}
