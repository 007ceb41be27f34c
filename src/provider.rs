//! Providers and the provider registry
//!
//! A provider is any `Fn` whose parameters are [`Dependency`] types and whose
//! return value is `Arc<T>`, optionally wrapped in a `Result` carrying a
//! diagnostic error. It is registered under the key of `T`.

use crate::dependency::{Dependency, resolve_param};
use crate::storage::Value;
use crate::{DiError, Injector, Resolvable, Result, TypeKey};
use ahash::RandomState;
use dashmap::DashMap;
use std::fmt::Display;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

/// Return value of a provider: exactly one primary value, with an optional
/// trailing error.
pub trait Output {
    /// The type the provider is registered under
    type Target: ?Sized + Resolvable;

    /// Split into the produced instance or the provider's own error message.
    fn into_instance(self) -> std::result::Result<Arc<Self::Target>, String>;
}

impl<T: ?Sized + Resolvable> Output for Arc<T> {
    type Target = T;

    #[inline]
    fn into_instance(self) -> std::result::Result<Arc<T>, String> {
        Ok(self)
    }
}

impl<T: ?Sized + Resolvable, E: Display> Output for std::result::Result<Arc<T>, E> {
    type Target = T;

    #[inline]
    fn into_instance(self) -> std::result::Result<Arc<T>, String> {
        self.map_err(|e| e.to_string())
    }
}

/// A factory function whose parameters are resolved from an injector.
///
/// Implemented for `Fn(A1, .., An) -> O` with up to 8 parameters.
pub trait Provider<Args>: Send + Sync + 'static {
    /// The type this provider produces
    type Target: ?Sized + Resolvable;

    /// Keys of the declared parameters, in order
    fn dependencies() -> Vec<TypeKey>;

    /// Resolve every parameter and call the provider.
    ///
    /// Parameters that cannot be resolved abort the call with
    /// [`DiError::MissingDependency`]; an error returned by the provider
    /// itself becomes [`DiError::CreationFailed`].
    fn provide(&self, injector: &Injector) -> Result<Arc<Self::Target>>;
}

macro_rules! impl_provider {
    ($($A:ident),*) => {
        impl<Func, O, $($A,)*> Provider<($($A,)*)> for Func
        where
            Func: Fn($($A),*) -> O + Send + Sync + 'static,
            O: Output,
            $($A: Dependency,)*
        {
            type Target = O::Target;

            fn dependencies() -> Vec<TypeKey> {
                vec![$(<$A as Dependency>::type_key()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn provide(&self, injector: &Injector) -> Result<Arc<O::Target>> {
                $(let $A = resolve_param::<$A>(injector)?;)*
                (self)($($A),*)
                    .into_instance()
                    .map_err(|reason| DiError::creation_failed::<O::Target>(reason))
            }
        }
    };
}

impl_provider!();
impl_provider!(A);
impl_provider!(A, B);
impl_provider!(A, B, C);
impl_provider!(A, B, C, D);
impl_provider!(A, B, C, D, E);
impl_provider!(A, B, C, D, E, F);
impl_provider!(A, B, C, D, E, F, G);
impl_provider!(A, B, C, D, E, F, G, H);

/// Type-erased provider call
type ProvideFn = Box<dyn Fn(&Injector) -> Result<Value> + Send + Sync>;

/// A registered provider with its output type erased.
pub(crate) struct ProviderEntry {
    key: TypeKey,
    dependencies: Vec<TypeKey>,
    call: ProvideFn,
}

impl ProviderEntry {
    fn new<Args, P: Provider<Args>>(provider: P) -> Self {
        Self {
            key: <P::Target as Resolvable>::type_key(),
            dependencies: P::dependencies(),
            call: Box::new(move |injector| provider.provide(injector).map(Value::new)),
        }
    }

    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn dependencies(&self) -> &[TypeKey] {
        &self.dependencies
    }

    /// Run the provider without storing its output.
    pub fn call(&self, injector: &Injector) -> Result<Value> {
        #[cfg(feature = "logging")]
        trace!(
            target: "type_injector",
            service = self.key.name(),
            dependencies = self.dependencies.len(),
            "Invoking provider"
        );

        (self.call)(injector)
    }
}

/// Registered providers, one per output key. Re-registering replaces.
pub(crate) struct ProviderRegistry {
    providers: DashMap<TypeKey, Arc<ProviderEntry>, RandomState>,
}

impl ProviderRegistry {
    #[inline]
    pub fn new() -> Self {
        Self {
            providers: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
        }
    }

    /// Register a provider under its output key, returning that key.
    pub fn register<Args, P: Provider<Args>>(&self, provider: P) -> TypeKey {
        let entry = ProviderEntry::new(provider);
        let key = entry.key();
        self.providers.insert(key, Arc::new(entry));
        key
    }

    /// Look up the provider for a key.
    ///
    /// Returns a clone of the entry so no shard guard is held while the
    /// provider runs and re-enters the injector.
    #[inline]
    pub fn get(&self, key: &TypeKey) -> Option<Arc<ProviderEntry>> {
        self.providers.get(key).map(|e| Arc::clone(e.value()))
    }

    #[inline]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.providers.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn keys(&self) -> Vec<TypeKey> {
        self.providers.iter().map(|r| *r.key()).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
