//! Type-indexed value storage
//!
//! Uses DashMap keyed with ahash, like the provider registry.

use crate::{Resolvable, TypeKey};
use ahash::RandomState;
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased bound value.
///
/// Holds an `Arc<T>` where `T` may be a concrete type or a `dyn Trait`
/// interface. Cloning is cheap and shares the underlying instance.
#[derive(Clone)]
pub struct Value {
    /// The erased `Arc<T>`
    inner: Arc<dyn Any + Send + Sync>,
    key: TypeKey,
}

impl Value {
    /// Wrap a shared instance, remembering the key of its type.
    #[inline]
    pub fn new<T: ?Sized + Resolvable>(instance: Arc<T>) -> Self {
        Self {
            inner: Arc::new(instance),
            key: T::type_key(),
        }
    }

    /// Wrap an owned concrete instance.
    #[inline]
    pub fn from_instance<T: Resolvable>(instance: T) -> Self {
        Self::new(Arc::new(instance))
    }

    /// Key of the type this value was created from
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.key.name()
    }

    /// Recover the shared instance if it holds a `T`.
    #[inline]
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }

    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.inner.is::<Arc<T>>()
    }

    /// True when both values share the same instance
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("type", &self.type_name()).finish()
    }
}

/// Map from [`TypeKey`] to the value currently bound under it.
///
/// Last write wins; a key maps to at most one value at any instant.
pub(crate) struct TypeStore {
    values: DashMap<TypeKey, Value, RandomState>,
}

impl TypeStore {
    /// Create an empty store.
    ///
    /// 8 shards: injectors rarely hold more than a few dozen values.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        let shard_amount = if capacity <= 16 { 8 } else { 16 };
        Self {
            values: DashMap::with_capacity_and_hasher_and_shard_amount(
                capacity,
                RandomState::new(),
                shard_amount,
            ),
        }
    }

    /// Bind a value, returning the one it replaced
    #[inline]
    pub fn set(&self, key: TypeKey, value: Value) -> Option<Value> {
        self.values.insert(key, value)
    }

    /// Look up a value. The shard guard is released before returning.
    #[inline]
    pub fn get(&self, key: &TypeKey) -> Option<Value> {
        self.values.get(key).map(|v| v.value().clone())
    }

    #[inline]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.values.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> Vec<TypeKey> {
        self.values.iter().map(|r| *r.key()).collect()
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeStore")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestService {
        value: i32,
    }

    #[test]
    fn test_store_set_and_get() {
        let store = TypeStore::new();
        let key = TypeKey::of::<TestService>();

        store.set(key, Value::from_instance(TestService { value: 42 }));

        let service = store.get(&key).unwrap().downcast::<TestService>().unwrap();
        assert_eq!(service.value, 42);
    }

    #[test]
    fn test_store_last_write_wins() {
        let store = TypeStore::new();
        let key = TypeKey::of::<TestService>();

        assert!(store.set(key, Value::from_instance(TestService { value: 1 })).is_none());
        let replaced = store.set(key, Value::from_instance(TestService { value: 2 }));

        assert_eq!(replaced.unwrap().downcast::<TestService>().unwrap().value, 1);
        assert_eq!(store.get(&key).unwrap().downcast::<TestService>().unwrap().value, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_miss_then_hit() {
        let store = TypeStore::new();
        let key = TypeKey::of::<TestService>();

        assert!(store.get(&key).is_none());
        assert!(!store.contains(&key));

        assert!(store.is_empty());

        store.set(key, Value::from_instance(TestService { value: 0 }));
        assert!(store.contains(&key));
        assert_eq!(store.keys(), vec![key]);
    }

    #[test]
    fn test_value_downcast_checks_type() {
        let value = Value::from_instance(TestService { value: 7 });

        assert!(value.is::<TestService>());
        assert!(value.downcast::<String>().is_none());
        assert_eq!(value.key(), TypeKey::of::<TestService>());

        let copy = value.clone();
        assert!(copy.ptr_eq(&value));
        assert!(Arc::ptr_eq(
            &copy.downcast::<TestService>().unwrap(),
            &value.downcast::<TestService>().unwrap()
        ));
    }
}
