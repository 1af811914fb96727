//! The reflection facade
//!
//! [`Reflector`] memoizes descriptor construction behind two caches: class
//! descriptors keyed by type name and object descriptors keyed by instance
//! identity. Both caches grow monotonically on misses and are cleared only
//! by [`Reflector::clear_cache`]. Under concurrent first-access races a
//! descriptor may be constructed twice, but the first handle inserted wins
//! and is returned to every racing caller, so a given key never yields two
//! live handles.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use cermin_core::{InstanceId, ObjectRef, Value};

use crate::annotation::{AnnotationHandle, AnnotationReader};
use crate::class::{ClassDescriptor, ObjectDescriptor};
use crate::member::{FieldDescriptor, MethodDescriptor, VisibilityFilter};
use crate::registry::{ClassDef, TypeRegistry};
use crate::{ReflectError, ReflectResult};

// ============================================================================
// Subject
// ============================================================================

/// What a facade operation is aimed at: a type name or a live instance.
///
/// Most operations accept `impl Into<Subject>`, so call sites pass a
/// `&str` or an `&ObjectRef` directly.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// A registered class, by name
    Name(&'a str),
    /// A live instance; resolves to its concrete class
    Instance(&'a ObjectRef),
}

impl<'a> Subject<'a> {
    /// The class name this subject resolves to
    pub fn class_name(self) -> &'a str {
        match self {
            Subject::Name(name) => name,
            Subject::Instance(object) => object.class_name(),
        }
    }
}

impl<'a> From<&'a str> for Subject<'a> {
    fn from(name: &'a str) -> Self {
        Subject::Name(name)
    }
}

impl<'a> From<&'a String> for Subject<'a> {
    fn from(name: &'a String) -> Self {
        Subject::Name(name.as_str())
    }
}

impl<'a> From<&'a ObjectRef> for Subject<'a> {
    fn from(object: &'a ObjectRef) -> Self {
        Subject::Instance(object)
    }
}

// ============================================================================
// Cache Sections
// ============================================================================

/// Bitmask selecting which descriptor caches a reset clears.
///
/// A mask containing neither recognized bit (for example
/// `CacheSections::from_bits(0)` or an unrecognized raw value) clears
/// BOTH caches; `Default` is likewise clear-both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSections(u8);

impl CacheSections {
    /// The class-descriptor cache
    pub const CLASS: CacheSections = CacheSections(0b01);
    /// The object-descriptor cache
    pub const OBJECT: CacheSections = CacheSections(0b10);
    /// Both caches
    pub const ALL: CacheSections = CacheSections(0b11);

    /// Build from a raw bit pattern (unknown bits are kept as-is)
    pub const fn from_bits(bits: u8) -> Self {
        CacheSections(bits)
    }

    /// Raw bit pattern
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set in this mask
    pub const fn contains(self, other: CacheSections) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set in this mask
    pub const fn intersects(self, other: CacheSections) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for CacheSections {
    fn default() -> Self {
        CacheSections::ALL
    }
}

impl std::ops::BitOr for CacheSections {
    type Output = CacheSections;

    fn bitor(self, rhs: CacheSections) -> CacheSections {
        CacheSections(self.0 | rhs.0)
    }
}

// ============================================================================
// Reflector
// ============================================================================

/// Memoizing reflection facade over a [`TypeRegistry`].
///
/// Owned by the composing application and passed wherever reflection is
/// needed; there is no process-global instance. `Reflector` is
/// `Send + Sync`, so one instance may serve several threads.
#[derive(Debug)]
pub struct Reflector {
    registry: Arc<RwLock<TypeRegistry>>,
    classes: RwLock<FxHashMap<String, Arc<ClassDescriptor>>>,
    objects: RwLock<FxHashMap<InstanceId, Arc<ObjectDescriptor>>>,
}

impl Reflector {
    /// Create a facade owning its registry.
    pub fn new(registry: TypeRegistry) -> Self {
        Reflector::with_shared_registry(Arc::new(RwLock::new(registry)))
    }

    /// Create a facade over a registry shared with other components.
    pub fn with_shared_registry(registry: Arc<RwLock<TypeRegistry>>) -> Self {
        Reflector {
            registry,
            classes: RwLock::new(FxHashMap::default()),
            objects: RwLock::new(FxHashMap::default()),
        }
    }

    /// The underlying registry.
    ///
    /// Definitions registered after a name was materialized stay invisible
    /// until [`Reflector::clear_cache`] discards the cached handle.
    pub fn registry(&self) -> &Arc<RwLock<TypeRegistry>> {
        &self.registry
    }

    // ========================================================================
    // Descriptor loading
    // ========================================================================

    /// Class descriptor for a type name or an instance's concrete class.
    ///
    /// Constructed on first access (parents recursively through this same
    /// cache) and memoized: repeated calls return the identical handle.
    pub fn load_class<'a>(
        &self,
        subject: impl Into<Subject<'a>>,
    ) -> ReflectResult<Arc<ClassDescriptor>> {
        let name = subject.into().class_name();
        let mut lineage = Vec::new();
        self.materialize(name, &mut lineage)
    }

    /// Method descriptor for `name` on the resolved class.
    ///
    /// Lookup walks the ancestor chain most-derived-first, so inherited
    /// methods are found.
    pub fn load_method<'a>(
        &self,
        subject: impl Into<Subject<'a>>,
        name: &str,
    ) -> ReflectResult<Arc<MethodDescriptor>> {
        let class = self.load_class(subject)?;
        match class.method(name) {
            Some(method) => Ok(method.clone()),
            None => Err(ReflectError::MethodNotFound {
                class: class.name().to_string(),
                method: name.to_string(),
            }),
        }
    }

    /// Object descriptor for a live instance.
    ///
    /// The value must be an object; any other kind fails with
    /// [`ReflectError::NotAnObject`] naming the kind received. Descriptors
    /// are memoized by instance identity: the same instance (through any
    /// clone of its handle) yields the identical descriptor.
    pub fn load_object(&self, value: &Value) -> ReflectResult<Arc<ObjectDescriptor>> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ReflectError::NotAnObject {
                    kind: other.kind(),
                })
            }
        };

        if let Some(cached) = self.objects.read().get(&object.id()) {
            return Ok(cached.clone());
        }

        let class = {
            let mut lineage = Vec::new();
            self.materialize(object.class_name(), &mut lineage)?
        };
        let built = Arc::new(ObjectDescriptor::new(object.id(), class));

        let mut cache = self.objects.write();
        Ok(cache.entry(object.id()).or_insert(built).clone())
    }

    // ========================================================================
    // Field listing and access
    // ========================================================================

    /// Field descriptors of the resolved class, filtered by visibility.
    ///
    /// Without ancestors: exactly the own-declared fields, in declaration
    /// order. With ancestors: every level's matching fields, concatenated
    /// most-ancestral-first (root first, the subject's own fields last).
    /// Names are not de-duplicated; a shadowed field appears once per
    /// declaring level.
    pub fn list_fields<'a>(
        &self,
        subject: impl Into<Subject<'a>>,
        include_ancestors: bool,
        filter: VisibilityFilter,
    ) -> ReflectResult<Vec<Arc<FieldDescriptor>>> {
        let class = self.load_class(subject)?;

        let mut levels = class.hierarchy();
        if include_ancestors {
            levels.reverse();
        } else {
            levels.truncate(1);
        }

        let mut fields = Vec::new();
        for level in levels {
            for field in level.own_fields() {
                if filter.matches(field.visibility()) {
                    fields.push(field.clone());
                }
            }
        }
        Ok(fields)
    }

    /// Read a field by name, bypassing declared visibility.
    ///
    /// The lookup sees only fields declared on the exact resolved class;
    /// ancestors are not searched. Static fields read the type's shared
    /// slot (a type-name subject suffices); instance fields require an
    /// instance subject and run the registered getter.
    pub fn get_field<'a>(
        &self,
        subject: impl Into<Subject<'a>>,
        name: &str,
    ) -> ReflectResult<Value> {
        let subject = subject.into();
        let class = self.load_class(subject)?;
        let field = match class.field(name) {
            Some(field) => field,
            None => return Err(field_not_found(&class, name)),
        };

        if field.is_static() {
            return class
                .static_value(name)
                .ok_or_else(|| field_not_found(&class, name));
        }

        let object = match subject {
            Subject::Instance(object) => object,
            Subject::Name(_) => return Err(instance_required(&class, name)),
        };
        let guard = object.read();
        field.read_from(&*guard).map_err(ReflectError::from)
    }

    /// Write a field by name, bypassing declared visibility.
    ///
    /// Same lookup rules as [`Reflector::get_field`]. Writing a static
    /// field updates the type's shared slot, visible to every instance.
    pub fn set_field<'a>(
        &self,
        subject: impl Into<Subject<'a>>,
        name: &str,
        value: Value,
    ) -> ReflectResult<()> {
        self.set_field_on(subject.into(), name, value)
    }

    /// Write several fields in one call, in iteration order.
    pub fn set_fields<'a, K>(
        &self,
        subject: impl Into<Subject<'a>>,
        entries: impl IntoIterator<Item = (K, Value)>,
    ) -> ReflectResult<()>
    where
        K: AsRef<str>,
    {
        let subject = subject.into();
        for (name, value) in entries {
            self.set_field_on(subject, name.as_ref(), value)?;
        }
        Ok(())
    }

    fn set_field_on(&self, subject: Subject<'_>, name: &str, value: Value) -> ReflectResult<()> {
        let class = self.load_class(subject)?;
        let field = match class.field(name) {
            Some(field) => field,
            None => return Err(field_not_found(&class, name)),
        };

        if field.is_static() {
            if class.set_static_value(name, value) {
                return Ok(());
            }
            return Err(field_not_found(&class, name));
        }

        let object = match subject {
            Subject::Instance(object) => object,
            Subject::Name(_) => return Err(instance_required(&class, name)),
        };
        let mut guard = object.write();
        field.write_to(&mut *guard, value).map_err(ReflectError::from)
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    /// Annotations attached to the resolved class, fetched through the
    /// injected reader.
    ///
    /// Without ancestors: exactly the reader's records for the class. With
    /// ancestors: the chain is walked most-derived-first and only the
    /// FIRST record of each concrete kind is kept, so a derived class's
    /// annotation wins over an ancestor's of the same kind; the result
    /// keeps first-encounter order. Results are never cached.
    pub fn load_annotations<'a>(
        &self,
        reader: &dyn AnnotationReader,
        subject: impl Into<Subject<'a>>,
        include_ancestors: bool,
    ) -> ReflectResult<Vec<AnnotationHandle>> {
        let class = self.load_class(subject)?;
        if !include_ancestors {
            return Ok(reader.class_annotations(&class));
        }

        let mut seen = FxHashSet::default();
        let mut merged = Vec::new();
        for level in class.hierarchy() {
            for record in reader.class_annotations(level) {
                if seen.insert(record.kind()) {
                    merged.push(record);
                }
            }
        }
        Ok(merged)
    }

    // ========================================================================
    // Cache lifecycle
    // ========================================================================

    /// Discard cached descriptors for the selected sections.
    ///
    /// A mask with neither recognized bit clears both caches.
    pub fn clear_cache(&self, sections: CacheSections) {
        let effective = if sections.intersects(CacheSections::ALL) {
            sections
        } else {
            CacheSections::ALL
        };

        if effective.contains(CacheSections::CLASS) {
            self.classes.write().clear();
        }
        if effective.contains(CacheSections::OBJECT) {
            self.objects.write().clear();
        }
    }

    /// Number of cached class descriptors
    pub fn cached_class_count(&self) -> usize {
        self.classes.read().len()
    }

    /// Number of cached object descriptors
    pub fn cached_object_count(&self) -> usize {
        self.objects.read().len()
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Fetch-or-build the descriptor for `name`. `lineage` carries the
    /// names currently being materialized to catch cyclic `extends`
    /// chains.
    fn materialize(
        &self,
        name: &str,
        lineage: &mut Vec<String>,
    ) -> ReflectResult<Arc<ClassDescriptor>> {
        if let Some(cached) = self.classes.read().get(name) {
            return Ok(cached.clone());
        }
        if lineage.iter().any(|seen| seen == name) {
            return Err(ReflectError::CyclicAncestry(name.to_string()));
        }

        // Snapshot the record so no registry lock is held while parents
        // materialize recursively.
        let (def, statics) = {
            let registry = self.registry.read();
            let record = registry
                .record(name)
                .ok_or_else(|| ReflectError::ClassNotFound(name.to_string()))?;
            (record.def.clone(), record.statics.clone())
        };

        let parent = match def.parent() {
            Some(parent_name) => {
                lineage.push(name.to_string());
                let parent_name = parent_name.to_string();
                let parent = self.materialize(&parent_name, lineage)?;
                lineage.pop();
                Some(parent)
            }
            None => None,
        };

        let built = Arc::new(assemble_class(&def, parent, statics));

        // First insert wins: a racing caller's handle takes precedence
        // over ours, so every caller observes the same descriptor.
        let mut cache = self.classes.write();
        Ok(cache.entry(name.to_string()).or_insert(built).clone())
    }
}

fn field_not_found(class: &ClassDescriptor, name: &str) -> ReflectError {
    ReflectError::FieldNotFound {
        class: class.name().to_string(),
        field: name.to_string(),
    }
}

fn instance_required(class: &ClassDescriptor, name: &str) -> ReflectError {
    ReflectError::InstanceRequired {
        class: class.name().to_string(),
        field: name.to_string(),
    }
}

/// Materialize descriptors for one registration. Static fields are
/// assigned slots in declaration order, matching the registry's slot
/// allocation.
fn assemble_class(
    def: &ClassDef,
    parent: Option<Arc<ClassDescriptor>>,
    statics: Arc<RwLock<Vec<Value>>>,
) -> ClassDescriptor {
    let mut next_slot = 0usize;
    let mut fields = Vec::with_capacity(def.fields.len());
    for field in &def.fields {
        let static_slot = if field.is_static {
            let slot = next_slot;
            next_slot += 1;
            Some(slot)
        } else {
            None
        };
        fields.push(FieldDescriptor {
            name: field.name.clone(),
            declaring_class: def.name.clone(),
            declared_type: field.declared_type.clone(),
            visibility: field.visibility,
            is_static: field.is_static,
            is_readonly: field.is_readonly,
            static_slot,
            getter: field.getter.clone(),
            setter: field.setter.clone(),
        });
    }

    let methods = def
        .methods
        .iter()
        .map(|method| MethodDescriptor {
            name: method.name.clone(),
            declaring_class: def.name.clone(),
            visibility: method.visibility,
            is_static: method.is_static,
            is_abstract: method.is_abstract,
            params: method.params.clone(),
        })
        .collect();

    ClassDescriptor::assemble(def.name.clone(), parent, fields, methods, statics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, AnnotationTable};
    use crate::member::Visibility;
    use crate::registry::{FieldDef, MethodDef};
    use cermin_core::{FromValue, Reflectable};

    struct Point {
        x: f64,
        y: i64,
    }

    impl Reflectable for Point {
        fn class_name(&self) -> &'static str {
            "Point"
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    struct Config;

    impl Reflectable for Config {
        fn class_name(&self) -> &'static str {
            "Config"
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    fn point_def() -> ClassDef {
        ClassDef::new("Point")
            .field(
                FieldDef::new("x", Visibility::Private)
                    .declared_type("Float")
                    .with_accessors::<Point, _, _>(
                        |point| Value::Float(point.x),
                        |point, value| {
                            point.x = f64::from_value(&value)?;
                            Ok(())
                        },
                    ),
            )
            .field(
                FieldDef::new("y", Visibility::Public)
                    .declared_type("Int")
                    .with_accessors::<Point, _, _>(
                        |point| Value::Int(point.y),
                        |point, value| {
                            point.y = i64::from_value(&value)?;
                            Ok(())
                        },
                    ),
            )
            .method(MethodDef::new("translate", Visibility::Public))
    }

    fn sample_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(point_def());
        registry.register(ClassDef::new("Config").field(
            FieldDef::new("version", Visibility::Public)
                .as_static()
                .initial_value(Value::Int(1)),
        ));
        registry
    }

    fn point(x: f64, y: i64) -> ObjectRef {
        ObjectRef::new(Point { x, y })
    }

    #[test]
    fn test_load_class_memoizes() {
        let reflector = Reflector::new(sample_registry());
        let first = reflector.load_class("Point").unwrap();
        let second = reflector.load_class("Point").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reflector.cached_class_count(), 1);
    }

    #[test]
    fn test_load_class_unknown_name() {
        let reflector = Reflector::new(sample_registry());
        let err = reflector.load_class("Ghost").unwrap_err();
        assert!(matches!(err, ReflectError::ClassNotFound(name) if name == "Ghost"));
    }

    #[test]
    fn test_load_class_from_instance() {
        let reflector = Reflector::new(sample_registry());
        let object = point(0.0, 0);
        let by_instance = reflector.load_class(&object).unwrap();
        let by_name = reflector.load_class("Point").unwrap();
        assert!(Arc::ptr_eq(&by_instance, &by_name));
    }

    #[test]
    fn test_load_method() {
        let reflector = Reflector::new(sample_registry());
        let method = reflector.load_method("Point", "translate").unwrap();
        assert_eq!(method.name(), "translate");
        assert_eq!(method.declaring_class(), "Point");

        let err = reflector.load_method("Point", "rotate").unwrap_err();
        assert!(matches!(
            err,
            ReflectError::MethodNotFound { class, method } if class == "Point" && method == "rotate"
        ));
    }

    #[test]
    fn test_load_object_rejects_non_objects() {
        let reflector = Reflector::new(sample_registry());

        for (value, kind) in [
            (Value::Null, "null"),
            (Value::Bool(true), "bool"),
            (Value::Int(3), "int"),
            (Value::Float(1.5), "float"),
            (Value::Str("Point".to_string()), "string"),
        ] {
            let err = reflector.load_object(&value).unwrap_err();
            match err {
                ReflectError::NotAnObject { kind: got } => assert_eq!(got.as_str(), kind),
                other => panic!("unexpected error: {other:?}"),
            }
            let message = reflector.load_object(&value).unwrap_err().to_string();
            assert!(message.contains(kind), "{message}");
        }
    }

    #[test]
    fn test_load_object_identity() {
        let reflector = Reflector::new(sample_registry());
        let a = point(1.0, 1);
        let b = point(2.0, 2);

        let first = reflector.load_object(&Value::Object(a.clone())).unwrap();
        let again = reflector.load_object(&Value::Object(a.clone())).unwrap();
        let through_clone = reflector.load_object(&Value::Object(a.clone())).unwrap();
        let other = reflector.load_object(&Value::Object(b)).unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert!(Arc::ptr_eq(&first, &through_clone));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(first.instance_id(), a.id());
        assert_eq!(reflector.cached_object_count(), 2);
    }

    #[test]
    fn test_instance_field_roundtrip() {
        let reflector = Reflector::new(sample_registry());
        let object = point(1.0, 10);

        reflector.set_field(&object, "x", Value::Float(2.5)).unwrap();
        assert_eq!(reflector.get_field(&object, "x").unwrap(), Value::Float(2.5));

        reflector.set_field(&object, "y", Value::Int(-4)).unwrap();
        assert_eq!(reflector.get_field(&object, "y").unwrap(), Value::Int(-4));
    }

    #[test]
    fn test_set_field_kind_mismatch() {
        let reflector = Reflector::new(sample_registry());
        let object = point(0.0, 0);

        let err = reflector
            .set_field(&object, "x", Value::Str("wide".to_string()))
            .unwrap_err();
        assert!(matches!(err, ReflectError::Access(_)));
    }

    #[test]
    fn test_field_not_found() {
        let reflector = Reflector::new(sample_registry());
        let object = point(0.0, 0);

        let err = reflector.get_field(&object, "z").unwrap_err();
        assert!(matches!(
            err,
            ReflectError::FieldNotFound { class, field } if class == "Point" && field == "z"
        ));
    }

    #[test]
    fn test_instance_field_requires_instance() {
        let reflector = Reflector::new(sample_registry());
        let err = reflector.set_field("Point", "x", Value::Float(0.0)).unwrap_err();
        assert!(matches!(err, ReflectError::InstanceRequired { .. }));

        let err = reflector.get_field("Point", "x").unwrap_err();
        assert!(matches!(err, ReflectError::InstanceRequired { .. }));
    }

    #[test]
    fn test_static_field_shared_across_instances() {
        let reflector = Reflector::new(sample_registry());
        let a = ObjectRef::new(Config);
        let b = ObjectRef::new(Config);

        assert_eq!(reflector.get_field("Config", "version").unwrap(), Value::Int(1));

        reflector.set_field(&a, "version", Value::Int(7)).unwrap();
        assert_eq!(reflector.get_field(&b, "version").unwrap(), Value::Int(7));
        assert_eq!(reflector.get_field("Config", "version").unwrap(), Value::Int(7));
    }

    #[test]
    fn test_set_fields_bulk() {
        let reflector = Reflector::new(sample_registry());
        let object = point(0.0, 0);

        reflector
            .set_fields(&object, [("x", Value::Float(3.0)), ("y", Value::Int(4))])
            .unwrap();

        assert_eq!(reflector.get_field(&object, "x").unwrap(), Value::Float(3.0));
        assert_eq!(reflector.get_field(&object, "y").unwrap(), Value::Int(4));
    }

    #[test]
    fn test_list_fields_visibility_filter() {
        let reflector = Reflector::new(sample_registry());

        let all = reflector
            .list_fields("Point", false, VisibilityFilter::default())
            .unwrap();
        assert_eq!(all.len(), 2);

        let public_only = reflector
            .list_fields("Point", false, VisibilityFilter::PUBLIC)
            .unwrap();
        let names: Vec<&str> = public_only.iter().map(|field| field.name()).collect();
        assert_eq!(names, vec!["y"]);
    }

    #[test]
    fn test_annotations_direct() {
        #[derive(Debug)]
        struct Tag;
        impl Annotation for Tag {
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        let reflector = Reflector::new(sample_registry());
        let mut table = AnnotationTable::new();
        table.annotate("Point", Tag);

        let records = reflector.load_annotations(&table, "Point", false).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is::<Tag>());
    }

    #[test]
    fn test_clear_cache_class_only() {
        let reflector = Reflector::new(sample_registry());
        let object = point(0.0, 0);
        let class_before = reflector.load_class("Point").unwrap();
        let object_before = reflector.load_object(&Value::Object(object.clone())).unwrap();

        reflector.clear_cache(CacheSections::CLASS);

        let class_after = reflector.load_class("Point").unwrap();
        let object_after = reflector.load_object(&Value::Object(object)).unwrap();
        assert!(!Arc::ptr_eq(&class_before, &class_after));
        assert!(Arc::ptr_eq(&object_before, &object_after));
    }

    #[test]
    fn test_clear_cache_object_only() {
        let reflector = Reflector::new(sample_registry());
        let object = point(0.0, 0);
        let class_before = reflector.load_class("Point").unwrap();
        let object_before = reflector.load_object(&Value::Object(object.clone())).unwrap();

        reflector.clear_cache(CacheSections::OBJECT);

        let class_after = reflector.load_class("Point").unwrap();
        let object_after = reflector.load_object(&Value::Object(object)).unwrap();
        assert!(Arc::ptr_eq(&class_before, &class_after));
        assert!(!Arc::ptr_eq(&object_before, &object_after));
    }

    #[test]
    fn test_clear_cache_unrecognized_mask_clears_both() {
        let reflector = Reflector::new(sample_registry());
        let object = point(0.0, 0);
        reflector.load_class("Point").unwrap();
        reflector.load_object(&Value::Object(object)).unwrap();

        reflector.clear_cache(CacheSections::from_bits(0b1000));
        assert_eq!(reflector.cached_class_count(), 0);
        assert_eq!(reflector.cached_object_count(), 0);
    }

    #[test]
    fn test_clear_cache_default_clears_both() {
        let reflector = Reflector::new(sample_registry());
        let object = point(0.0, 0);
        reflector.load_class("Point").unwrap();
        reflector.load_object(&Value::Object(object)).unwrap();

        reflector.clear_cache(CacheSections::default());
        assert_eq!(reflector.cached_class_count(), 0);
        assert_eq!(reflector.cached_object_count(), 0);
    }

    #[test]
    fn test_static_value_survives_cache_clear() {
        let reflector = Reflector::new(sample_registry());
        reflector.set_field("Config", "version", Value::Int(9)).unwrap();

        reflector.clear_cache(CacheSections::ALL);
        assert_eq!(reflector.get_field("Config", "version").unwrap(), Value::Int(9));
    }

    #[test]
    fn test_reregistration_visible_after_clear() {
        let shared = Arc::new(RwLock::new(sample_registry()));
        let reflector = Reflector::with_shared_registry(shared.clone());

        let before = reflector.load_class("Point").unwrap();
        assert!(before.has_field("x"));

        shared
            .write()
            .register(ClassDef::new("Point").field(FieldDef::new("renamed", Visibility::Public)));

        // Cached handle still serves the old definition.
        let cached = reflector.load_class("Point").unwrap();
        assert!(Arc::ptr_eq(&before, &cached));

        reflector.clear_cache(CacheSections::CLASS);
        let after = reflector.load_class("Point").unwrap();
        assert!(!after.has_field("x"));
        assert!(after.has_field("renamed"));
    }

    #[test]
    fn test_cyclic_ancestry_detected() {
        let mut registry = TypeRegistry::new();
        registry.register(ClassDef::new("A").extends("B"));
        registry.register(ClassDef::new("B").extends("A"));

        let reflector = Reflector::new(registry);
        let err = reflector.load_class("A").unwrap_err();
        assert!(matches!(err, ReflectError::CyclicAncestry(_)));
    }

    #[test]
    fn test_unregistered_parent_propagates() {
        let mut registry = TypeRegistry::new();
        registry.register(ClassDef::new("Orphan").extends("Missing"));

        let reflector = Reflector::new(registry);
        let err = reflector.load_class("Orphan").unwrap_err();
        assert!(matches!(err, ReflectError::ClassNotFound(name) if name == "Missing"));
    }

    #[test]
    fn test_concurrent_load_shares_one_handle() {
        let reflector = Arc::new(Reflector::new(sample_registry()));

        let mut workers = Vec::new();
        for _ in 0..8 {
            let reflector = reflector.clone();
            workers.push(std::thread::spawn(move || {
                reflector.load_class("Point").unwrap()
            }));
        }

        let descriptors: Vec<_> = workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect();
        for descriptor in &descriptors[1..] {
            assert!(Arc::ptr_eq(&descriptors[0], descriptor));
        }
        assert_eq!(reflector.cached_class_count(), 1);
    }
}
