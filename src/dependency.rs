//! Parameter types an injector knows how to supply.

use crate::{DiError, Injector, Resolvable, Result, TypeKey};
use std::sync::Arc;

/// A type that can appear as a parameter of an invoked function or provider.
///
/// Implemented for:
/// - `Arc<T>` - required, resolved under `T`'s concrete key
/// - `Arc<dyn I>` - required, resolved under the interface key of `I`
/// - `Option<Arc<T>>` - optional, `None` when nothing is bound
pub trait Dependency: Sized + 'static {
    /// Key the dependency is resolved under
    fn type_key() -> TypeKey;

    /// Resolve the dependency from an injector.
    fn resolve(injector: &Injector) -> Result<Self>;
}

impl<T: ?Sized + Resolvable> Dependency for Arc<T> {
    #[inline]
    fn type_key() -> TypeKey {
        <T as Resolvable>::type_key()
    }

    #[inline]
    fn resolve(injector: &Injector) -> Result<Self> {
        injector.resolve::<T>()
    }
}

impl<T: ?Sized + Resolvable> Dependency for Option<Arc<T>> {
    #[inline]
    fn type_key() -> TypeKey {
        <T as Resolvable>::type_key()
    }

    fn resolve(injector: &Injector) -> Result<Self> {
        match injector.resolve::<T>() {
            Ok(found) => Ok(Some(found)),
            Err(DiError::ValueNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Resolve one parameter, reporting failures as a missing dependency.
#[inline]
pub fn resolve_param<D: Dependency>(injector: &Injector) -> Result<D> {
    D::resolve(injector).map_err(|err| DiError::missing(<D as Dependency>::type_key(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_dependency() {
        let injector = Injector::new();
        injector.map(5u32);

        let found = <Arc<u32> as Dependency>::resolve(&injector).unwrap();
        assert_eq!(*found, 5);
    }

    #[test]
    fn test_optional_dependency_absent_is_none() {
        let injector = Injector::new();

        let found = <Option<Arc<u32>> as Dependency>::resolve(&injector).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_missing_param_is_wrapped() {
        let injector = Injector::new();

        let err = resolve_param::<Arc<u32>>(&injector).unwrap_err();
        match err {
            DiError::MissingDependency { type_name, source } => {
                assert_eq!(type_name, "u32");
                assert!(matches!(*source, DiError::ValueNotFound { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
