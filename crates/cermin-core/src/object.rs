//! Reflectable instances and identity
//!
//! Applications implement [`Reflectable`] for every type they register with
//! the reflection engine and hand instances to it wrapped in an
//! [`ObjectRef`]. The wrapper owns the instance behind a reference-counted
//! read-write lock and mints a process-unique [`InstanceId`] at creation
//! time; clones of the same `ObjectRef` share both the instance and the id,
//! so identity survives handle copies and is never reused for a new
//! instance.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global counter for instance ids (skip 0 so ids are always truthy)
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

fn generate_instance_id() -> u64 {
    NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Trait implemented by application types that participate in reflection.
///
/// `class_name` must return the name under which the type's metadata is
/// registered; the `Any` accessors let registered field accessors downcast
/// back to the concrete type.
pub trait Reflectable: Any + Send + Sync {
    /// Name of the registered class this instance belongs to
    fn class_name(&self) -> &'static str;

    /// Upcast to `Any` for downcasting in accessors
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast to `Any` for downcasting in accessors
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Stable identity token for one live instance.
///
/// Assigned from a process-wide counter when the owning [`ObjectRef`] is
/// created and never reused, so descriptor caches keyed by `InstanceId`
/// cannot confuse a new instance with a collected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Raw counter value (diagnostics only)
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared handle to a live reflectable instance.
///
/// Cloning is cheap (reference count bump) and preserves identity: all
/// clones report the same [`InstanceId`]. Interior access goes through a
/// read-write lock so the reflection engine can run registered setters
/// against `&mut` state while holding only `&self`.
#[derive(Clone)]
pub struct ObjectRef {
    id: InstanceId,
    inner: Arc<RwLock<dyn Reflectable>>,
}

impl ObjectRef {
    /// Wrap an instance, assigning it a fresh identity token.
    pub fn new<T: Reflectable>(instance: T) -> Self {
        ObjectRef {
            id: InstanceId(generate_instance_id()),
            inner: Arc::new(RwLock::new(instance)),
        }
    }

    /// Identity token of the wrapped instance
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Registered class name of the wrapped instance
    pub fn class_name(&self) -> &'static str {
        self.inner.read().class_name()
    }

    /// Acquire shared access to the instance
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Reflectable> {
        self.inner.read()
    }

    /// Acquire exclusive access to the instance
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Reflectable> {
        self.inner.write()
    }

    /// Run a closure against the concrete instance type.
    ///
    /// Returns `None` if the instance is not a `T`.
    pub fn with<T: Reflectable, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.inner.read();
        guard.as_any().downcast_ref::<T>().map(f)
    }

    /// Run a closure against the concrete instance type, mutably.
    ///
    /// Returns `None` if the instance is not a `T`.
    pub fn with_mut<T: Reflectable, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.inner.write();
        guard.as_any_mut().downcast_mut::<T>().map(f)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectRef {}

impl std::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectRef({}{})", self.class_name(), self.id)
    }
}
