//! Struct binding
//!
//! [`Inject`] writes resolved values into the tagged fields of an existing
//! struct; [`Constructible`] describes how a type is built when no provider
//! is registered for it. Both are normally generated by `#[derive(Inject)]`.

use crate::{DiError, Injector, Resolvable, Result};
use std::sync::Arc;

/// Types whose tagged fields can be filled in from an injector.
///
/// Derived implementations assign fields in declaration order and stop at
/// the first field that cannot be resolved, leaving the remaining fields as
/// they were. Types without injectable fields use the default no-op.
pub trait Inject {
    /// Resolve and assign every tagged field.
    fn inject(&mut self, injector: &Injector) -> Result<()> {
        let _ = injector;
        Ok(())
    }
}

/// Types an injector can build from nothing.
///
/// `Injector::construct` prefers a registered provider; `fallback` is used
/// only when there is none. The default fallback fails with
/// [`DiError::NotConstructible`]; `#[derive(Inject)]` overrides it to build
/// the struct field by field.
pub trait Constructible: Resolvable {
    fn fallback(injector: &Injector) -> Result<Arc<Self>> {
        let _ = injector;
        Err(DiError::not_constructible::<Self>())
    }
}

/// Types with nothing to inject: `apply` succeeds without touching them and
/// `construct` needs a provider.
macro_rules! impl_inert {
    ($($t:ty),+ $(,)?) => {
        $(
            impl Inject for $t {}
            impl Constructible for $t {}
        )+
    };
}

impl_inert!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str, ()
);
