//! The process-wide default injector.
//!
//! Created on first use and never torn down. Every function here holds the
//! default injector's lock for the whole call, so calls from different
//! threads are serialized. The lock is not re-entrant: providers,
//! invoked functions and deferred targets run while it is held and must
//! not call back into this module.
//!
//! ```rust
//! use std::sync::Arc;
//! use type_injector::global;
//!
//! struct Banner(String);
//!
//! global::map(String::from("welcome"));
//! global::provide(|text: Arc<String>| Arc::new(Banner(text.to_uppercase())));
//!
//! assert_eq!(global::resolve::<Banner>().unwrap().0, "WELCOME");
//! ```

use crate::apply::{Constructible, Inject};
use crate::deferred::Deferred;
use crate::invoke::Invocable;
use crate::provider::Provider;
use crate::storage::Value;
use crate::{Injector, Interface, Resolvable, Result, TypeKey};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;

static DEFAULT: Lazy<Mutex<Injector>> = Lazy::new(|| Mutex::new(Injector::new()));

/// Run `f` with the default injector locked.
pub fn with_default<R>(f: impl FnOnce(&Injector) -> R) -> R {
    let injector = DEFAULT.lock();
    f(&injector)
}

pub fn provide<Args, P: Provider<Args>>(provider: P) {
    with_default(|injector| {
        injector.provide(provider);
    })
}

pub fn map<T: Resolvable>(value: T) {
    with_default(|injector| {
        injector.map(value);
    })
}

pub fn map_to<I: ?Sized + Interface>(value: Arc<I>) {
    with_default(|injector| {
        injector.map_to(value);
    })
}

pub fn set(key: TypeKey, value: Value) {
    with_default(|injector| {
        injector.set(key, value);
    })
}

pub fn get(key: TypeKey) -> Option<Value> {
    with_default(|injector| injector.get(key))
}

pub fn resolve<T: ?Sized + Resolvable>() -> Result<Arc<T>> {
    with_default(|injector| injector.resolve::<T>())
}

pub fn invoke<Args, F: Invocable<Args>>(f: F) -> Result<F::Output> {
    with_default(|injector| injector.invoke(f))
}

pub fn apply<T: ?Sized + Inject>(target: &mut T) -> Result<()> {
    with_default(|injector| injector.apply(target))
}

pub fn construct<T: ?Sized + Constructible>() -> Result<Arc<T>> {
    with_default(|injector| injector.construct::<T>())
}

pub fn construct_later<T: ?Sized + Constructible>() -> Deferred<T> {
    with_default(|injector| injector.construct_later::<T>())
}

pub fn finish_construct() -> Result<()> {
    with_default(|injector| injector.finish_construct())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // The default injector is shared by every test in the process, so each
    // test binds types of its own.

    struct GlobalOnlyMarker(u8);
    struct GlobalLater(&'static str);
    impl Constructible for GlobalLater {}

    #[test]
    fn test_map_then_resolve() {
        map(GlobalOnlyMarker(3));
        assert_eq!(resolve::<GlobalOnlyMarker>().unwrap().0, 3);
        assert!(get(TypeKey::of::<GlobalOnlyMarker>()).is_some());
    }

    #[test]
    fn test_deferred_through_default() {
        // Provider first: other tests finish the shared queue concurrently
        provide(|| Arc::new(GlobalLater("done")));
        let later = construct_later::<GlobalLater>();

        finish_construct().unwrap();
        assert_eq!(later.get().unwrap().0, "done");
    }

    struct Seed<const N: usize>(usize);
    struct Built<const N: usize>(usize);
    struct Queued<const N: usize>(usize);
    impl<const N: usize> Constructible for Queued<N> {}

    static ACTIVE: AtomicUsize = AtomicUsize::new(0);
    static PEAK: AtomicUsize = AtomicUsize::new(0);

    /// Bind, provide, resolve and finalize types owned by this caller only.
    fn exercise<const N: usize>() {
        map(Seed::<N>(N));
        provide(|seed: Arc<Seed<N>>| {
            let now = ACTIVE.fetch_add(1, Ordering::SeqCst) + 1;
            PEAK.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(2));
            ACTIVE.fetch_sub(1, Ordering::SeqCst);
            Arc::new(Built::<N>(seed.0 * 10))
        });
        provide(|built: Arc<Built<N>>| Arc::new(Queued::<N>(built.0 + 1)));

        let later = construct_later::<Queued<N>>();
        assert_eq!(resolve::<Built<N>>().unwrap().0, N * 10);

        finish_construct().unwrap();
        assert_eq!(later.get().unwrap().0, N * 10 + 1);
    }

    #[test]
    fn test_default_serializes_concurrent_callers() {
        std::thread::scope(|scope| {
            scope.spawn(exercise::<1>);
            scope.spawn(exercise::<2>);
            scope.spawn(exercise::<3>);
            scope.spawn(exercise::<4>);
            scope.spawn(exercise::<5>);
            scope.spawn(exercise::<6>);
            scope.spawn(exercise::<7>);
            scope.spawn(exercise::<8>);
        });

        assert_eq!(PEAK.load(Ordering::SeqCst), 1);
        for key in [
            TypeKey::of::<Built<1>>(),
            TypeKey::of::<Built<4>>(),
            TypeKey::of::<Built<8>>(),
        ] {
            assert!(with_default(|injector| injector.contains(key)));
        }
    }

    #[test]
    fn test_with_default_sees_bindings() {
        struct Seen(u32);
        map(Seen(12));

        let found = with_default(|injector| injector.contains(TypeKey::of::<Seen>()));
        assert!(found);
    }

    #[test]
    fn test_invoke_missing_from_default() {
        struct NeverBound;

        let err = invoke(|_: Arc<NeverBound>| ()).unwrap_err();
        assert!(matches!(err, DiError::MissingDependency { .. }));
    }
}
