//! Functions whose arguments are supplied by an injector.

use crate::dependency::{Dependency, resolve_param};
use crate::{Injector, Result, TypeKey};

/// A callable whose parameters are all [`Dependency`] types.
///
/// Implemented for `FnOnce(A1, .., An) -> R` with up to 8 parameters. Every
/// parameter is resolved, in declared order, before the function runs; the
/// function is not called at all if any of them is missing.
pub trait Invocable<Args> {
    /// Whatever the function returns, passed back unexamined
    type Output;

    /// Keys of the declared parameters, in order
    fn dependencies() -> Vec<TypeKey>;

    fn invoke(self, injector: &Injector) -> Result<Self::Output>;
}

macro_rules! impl_invocable {
    ($($A:ident),*) => {
        impl<Func, R, $($A,)*> Invocable<($($A,)*)> for Func
        where
            Func: FnOnce($($A),*) -> R,
            $($A: Dependency,)*
        {
            type Output = R;

            fn dependencies() -> Vec<TypeKey> {
                vec![$(<$A as Dependency>::type_key()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn invoke(self, injector: &Injector) -> Result<R> {
                $(let $A = resolve_param::<$A>(injector)?;)*
                Ok(self($($A),*))
            }
        }
    };
}

impl_invocable!();
impl_invocable!(A);
impl_invocable!(A, B);
impl_invocable!(A, B, C);
impl_invocable!(A, B, C, D);
impl_invocable!(A, B, C, D, E);
impl_invocable!(A, B, C, D, E, F);
impl_invocable!(A, B, C, D, E, F, G);
impl_invocable!(A, B, C, D, E, F, G, H);

/// Parameter keys of a callable, without invoking it.
pub fn dependencies_of<Args, F: Invocable<Args>>(_f: &F) -> Vec<TypeKey> {
    F::dependencies()
}
