//! The injector
//!
//! An `Injector` owns a type store, a provider registry and a deferred
//! construction queue, and may delegate misses to a parent injector.

use crate::apply::{Constructible, Inject};
use crate::deferred::{Deferred, DeferredQueue};
use crate::invoke::Invocable;
use crate::provider::{Provider, ProviderEntry, ProviderRegistry};
use crate::storage::{TypeStore, Value};
use crate::{DiError, Interface, Resolvable, Result, TypeKey};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

struct Inner {
    values: TypeStore,
    providers: ProviderRegistry,
    deferred: DeferredQueue,
    /// Non-owning link; a dropped parent behaves like an empty one
    parent: RwLock<Option<Weak<Inner>>>,
}

/// Type-keyed dependency injector.
///
/// Resolution of a key checks, in order, the values bound in this injector,
/// the providers registered here, and then the parent injector. Cloning an
/// `Injector` yields another handle to the same injector.
///
/// An injector is safe to share across threads, but a resolution is not
/// atomic with respect to concurrent registrations: use one injector per
/// resolution scope or serialize access externally (see [`crate::global`]).
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use type_injector::Injector;
///
/// struct Database { url: String }
/// struct Repository { db: Arc<Database> }
///
/// let injector = Injector::new();
/// injector
///     .map(String::from("postgres://localhost"))
///     .provide(|url: Arc<String>| Arc::new(Database { url: url.to_string() }))
///     .provide(|db: Arc<Database>| Arc::new(Repository { db }));
///
/// let repo = injector.resolve::<Repository>().unwrap();
/// assert_eq!(repo.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<Inner>,
}

impl Injector {
    /// Create an injector with no bindings and no parent.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an injector with room for `capacity` bound values.
    pub fn with_capacity(capacity: usize) -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "type_injector",
            capacity = capacity,
            "Creating new injector"
        );

        Self {
            inner: Arc::new(Inner {
                values: TypeStore::with_capacity(capacity),
                providers: ProviderRegistry::new(),
                deferred: DeferredQueue::new(),
                parent: RwLock::new(None),
            }),
        }
    }

    /// Create an injector whose parent is `self`.
    ///
    /// The child does not keep `self` alive.
    pub fn child(&self) -> Self {
        let child = Self::new();
        child.set_parent(self);
        child
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Register a provider under the type it returns.
    ///
    /// The provider runs the first time its type is requested and cannot be
    /// found among the bound values; its output is then bound, so it runs
    /// at most once per successful resolution. Registering another provider
    /// for the same type replaces the first.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use type_injector::Injector;
    ///
    /// struct Pool { size: usize }
    ///
    /// let injector = Injector::new();
    /// injector
    ///     .map(4usize)
    ///     .provide(|size: Arc<usize>| -> Result<Arc<Pool>, String> {
    ///         if *size == 0 {
    ///             return Err("empty pool".into());
    ///         }
    ///         Ok(Arc::new(Pool { size: *size }))
    ///     });
    ///
    /// assert_eq!(injector.resolve::<Pool>().unwrap().size, 4);
    /// ```
    pub fn provide<Args, P: Provider<Args>>(&self, provider: P) -> &Self {
        let key = self.inner.providers.register(provider);

        #[cfg(feature = "logging")]
        debug!(
            target: "type_injector",
            service = key.name(),
            providers = self.inner.providers.len(),
            "Registering provider"
        );
        #[cfg(not(feature = "logging"))]
        let _ = key;

        self
    }

    /// Bind a value under its concrete type.
    #[inline]
    pub fn map<T: Resolvable>(&self, value: T) -> &Self {
        self.set(TypeKey::of::<T>(), Value::from_instance(value))
    }

    /// Bind a value under an interface key.
    ///
    /// The value is visible only as `Arc<dyn I>`; its concrete type stays
    /// unbound unless mapped separately.
    #[inline]
    pub fn map_to<I: ?Sized + Interface>(&self, value: Arc<I>) -> &Self {
        self.set(TypeKey::interface::<I>(), Value::new(value))
    }

    /// Bind an already erased value under an interface key.
    ///
    /// # Panics
    ///
    /// Panics if `key` is a concrete key, or if `value` was not created from
    /// an `Arc<dyn I>` for that same interface.
    #[track_caller]
    pub fn map_to_key(&self, value: Value, key: TypeKey) -> &Self {
        let key = key.expect_interface();
        if value.key() != key {
            panic!(
                "{}",
                DiError::TypeMismatch {
                    expected: key.name(),
                    found: value.type_name(),
                }
            );
        }
        self.set(key, value)
    }

    /// Bind a value under an arbitrary key, replacing any previous binding.
    pub fn set(&self, key: TypeKey, value: Value) -> &Self {
        #[cfg(feature = "logging")]
        trace!(
            target: "type_injector",
            key = %key,
            value = value.type_name(),
            "Binding value"
        );

        self.inner.values.set(key, value);
        self
    }

    /// Make `parent` the fallback for keys this injector cannot resolve.
    ///
    /// Only a weak reference is kept. Parent chains must not form a cycle.
    pub fn set_parent(&self, parent: &Injector) {
        #[cfg(feature = "logging")]
        debug!(
            target: "type_injector",
            parent_values = parent.inner.values.len(),
            "Setting parent injector"
        );

        *self.inner.parent.write() = Some(Arc::downgrade(&parent.inner));
    }

    /// The parent injector, if one is set and still alive
    pub fn parent(&self) -> Option<Injector> {
        self.inner
            .parent
            .read()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Injector { inner })
    }

    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Look up the value for a key.
    ///
    /// Returns `None` when nothing is bound, provided or inherited, and
    /// also when a provider for the key fails; use [`Injector::lookup`] to
    /// see why.
    #[inline]
    pub fn get(&self, key: TypeKey) -> Option<Value> {
        self.lookup(key).ok()
    }

    /// Look up the value for a key: bound values, then providers, then the
    /// parent.
    pub fn lookup(&self, key: TypeKey) -> Result<Value> {
        if let Some(value) = self.inner.values.get(&key) {
            #[cfg(feature = "logging")]
            trace!(
                target: "type_injector",
                key = %key,
                location = "store",
                "Value resolved from type store"
            );
            return Ok(value);
        }

        if let Some(provider) = self.inner.providers.get(&key) {
            return self.run_provider(&provider);
        }

        if let Some(parent) = self.parent() {
            #[cfg(feature = "logging")]
            trace!(
                target: "type_injector",
                key = %key,
                "Value not bound locally, delegating to parent"
            );
            return parent.lookup(key);
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "type_injector",
            key = %key,
            "Value not found"
        );

        Err(DiError::not_found(key))
    }

    /// Run a provider and bind its output. A failing provider binds nothing.
    fn run_provider(&self, provider: &ProviderEntry) -> Result<Value> {
        let value = provider.call(self)?;
        self.inner.values.set(provider.key(), value.clone());

        #[cfg(feature = "logging")]
        trace!(
            target: "type_injector",
            key = %provider.key(),
            location = "provider",
            "Value created by provider"
        );

        Ok(value)
    }

    /// Resolve a value by type.
    ///
    /// `T` is a concrete type or a `dyn Trait` declared with
    /// [`interface!`](crate::interface).
    pub fn resolve<T: ?Sized + Resolvable>(&self) -> Result<Arc<T>> {
        let value = self.lookup(T::type_key())?;
        value.downcast::<T>().ok_or(DiError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found: value.type_name(),
        })
    }

    /// Resolve a value by type, returning `None` on any failure.
    #[inline]
    pub fn try_resolve<T: ?Sized + Resolvable>(&self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    /// Call a function with every parameter resolved from this injector.
    ///
    /// Fails with [`DiError::MissingDependency`] without calling `f` if any
    /// parameter cannot be resolved. Whatever `f` returns, including its own
    /// errors, is passed back untouched.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use type_injector::Injector;
    ///
    /// let injector = Injector::new();
    /// injector.map(String::from("world")).map(3u8);
    ///
    /// let greeting = injector
    ///     .invoke(|name: Arc<String>, times: Arc<u8>| format!("hello {name} x{times}"))
    ///     .unwrap();
    /// assert_eq!(greeting, "hello world x3");
    ///
    /// assert!(injector.invoke(|_: Arc<u64>| ()).is_err());
    /// ```
    pub fn invoke<Args, F: Invocable<Args>>(&self, f: F) -> Result<F::Output> {
        #[cfg(feature = "logging")]
        trace!(
            target: "type_injector",
            parameters = F::dependencies().len(),
            "Invoking function"
        );

        f.invoke(self)
    }

    /// Fill the tagged fields of `target`.
    ///
    /// Stops at the first field that cannot be resolved and returns its
    /// error; fields after it keep their previous values. Types without
    /// injectable fields are left untouched.
    #[inline]
    pub fn apply<T: ?Sized + Inject>(&self, target: &mut T) -> Result<()> {
        target.inject(self)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Build a `T` now.
    ///
    /// Uses the nearest provider registered for `T`, in this injector or an
    /// ancestor (its output is not bound), and otherwise `T`'s field-by-field
    /// fallback against this injector. Types with neither fail with
    /// [`DiError::NotConstructible`].
    pub fn construct<T: ?Sized + Constructible>(&self) -> Result<Arc<T>> {
        let key = T::type_key();

        if let Some((owner, provider)) = self.find_provider(&key) {
            #[cfg(feature = "logging")]
            trace!(
                target: "type_injector",
                key = %key,
                inherited = !Arc::ptr_eq(&owner.inner, &self.inner),
                "Constructing from provider"
            );

            // Parameters resolve where the provider is registered, as in lookup
            let value = provider.call(&owner)?;
            return value.downcast::<T>().ok_or(DiError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: value.type_name(),
            });
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "type_injector",
            key = %key,
            "No provider, constructing from fields"
        );

        T::fallback(self)
    }

    /// The nearest injector in the parent chain with a provider for `key`.
    fn find_provider(&self, key: &TypeKey) -> Option<(Injector, Arc<ProviderEntry>)> {
        let mut current = Some(self.clone());
        while let Some(injector) = current {
            if let Some(provider) = injector.inner.providers.get(key) {
                return Some((injector, provider));
            }
            current = injector.parent();
        }
        None
    }

    /// Reserve a `T` to be built by the next [`Injector::finish_construct`].
    ///
    /// Nothing is resolved now, so `T`'s dependencies may be bound later.
    #[inline]
    pub fn construct_later<T: ?Sized + Constructible>(&self) -> Deferred<T> {
        self.inner.deferred.enqueue::<T>()
    }

    /// Build every target reserved with [`Injector::construct_later`].
    ///
    /// Every target is attempted even if earlier ones fail; all failures are
    /// returned together as [`DiError::Finalize`]. Failed targets stay empty
    /// and remain queued for the next call.
    #[inline]
    pub fn finish_construct(&self) -> Result<()> {
        self.inner.deferred.finish(self)
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// Whether a value is bound under `key` in this injector (not parents).
    #[inline]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.inner.values.contains(&key)
    }

    /// Whether a provider is registered for `key` in this injector.
    #[inline]
    pub fn has_provider(&self, key: TypeKey) -> bool {
        self.inner.providers.contains(&key)
    }

    /// Number of bound values in this injector
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.values.is_empty()
    }

    /// Keys of the values bound in this injector
    pub fn registered_keys(&self) -> Vec<TypeKey> {
        self.inner.values.keys()
    }

    /// Keys of the providers registered in this injector
    pub fn provider_keys(&self) -> Vec<TypeKey> {
        self.inner.providers.keys()
    }

    /// Parameter keys of the provider registered for `key` in this
    /// injector, in declared order.
    pub fn provider_dependencies(&self, key: TypeKey) -> Option<Vec<TypeKey>> {
        self.inner
            .providers
            .get(&key)
            .map(|provider| provider.dependencies().to_vec())
    }

    /// Number of targets waiting for [`Injector::finish_construct`]
    #[inline]
    pub fn pending(&self) -> usize {
        self.inner.deferred.len()
    }

    /// Keys of the targets waiting for [`Injector::finish_construct`], in
    /// queue order
    pub fn pending_keys(&self) -> Vec<TypeKey> {
        self.inner.deferred.keys()
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<_> = self.registered_keys().iter().map(TypeKey::name).collect();
        let providers: Vec<_> = self.provider_keys().iter().map(TypeKey::name).collect();
        let pending: Vec<_> = self.pending_keys().iter().map(TypeKey::name).collect();
        f.debug_struct("Injector")
            .field("values", &values)
            .field("providers", &providers)
            .field("pending", &pending)
            .field("has_parent", &self.has_parent())
            .finish()
    }
}
