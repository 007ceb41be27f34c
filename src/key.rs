//! Type keys
//!
//! Every value, provider and dependency is addressed by a [`TypeKey`]. Concrete
//! types and interfaces (`dyn Trait` object types) live in separate key
//! namespaces: a value mapped under its concrete type is never visible under
//! an interface key unless it is bound there explicitly.

use std::any::TypeId;
use std::fmt;

/// Identity under which a value is stored and retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// A concrete, sized type
    Concrete { id: TypeId, name: &'static str },
    /// A `dyn Trait` declared with [`interface!`](crate::interface)
    Interface { id: TypeId, name: &'static str },
}

impl TypeKey {
    /// Key of a concrete type.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        TypeKey::Concrete {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key of an interface type.
    ///
    /// ```rust
    /// use type_injector::{interface, TypeKey};
    ///
    /// trait Greeter: Send + Sync {}
    /// interface!(Greeter);
    ///
    /// assert!(TypeKey::interface::<dyn Greeter>().is_interface());
    /// ```
    #[inline]
    pub fn interface<I: ?Sized + Interface>() -> Self {
        TypeKey::Interface {
            id: TypeId::of::<I>(),
            name: std::any::type_name::<I>(),
        }
    }

    /// Human-readable type name
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            TypeKey::Concrete { name, .. } | TypeKey::Interface { name, .. } => *name,
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        match self {
            TypeKey::Concrete { id, .. } | TypeKey::Interface { id, .. } => *id,
        }
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        matches!(self, TypeKey::Interface { .. })
    }

    /// Return the key unchanged if it names an interface.
    ///
    /// # Panics
    ///
    /// Panics when the key is concrete.
    #[track_caller]
    pub fn expect_interface(self) -> Self {
        if !self.is_interface() {
            panic!(
                "{}",
                crate::DiError::InvalidInterfaceMarker {
                    type_name: self.name()
                }
            );
        }
        self
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Concrete { name, .. } => f.write_str(name),
            TypeKey::Interface { name, .. } => write!(f, "interface {name}"),
        }
    }
}

/// Types that own a slot in an injector.
///
/// Implemented automatically for every sized `Send + Sync + 'static` type
/// (keyed as concrete). Interfaces get their implementation from
/// [`interface!`](crate::interface).
pub trait Resolvable: Send + Sync + 'static {
    /// The key values of this type are stored under
    fn type_key() -> TypeKey;
}

impl<T: Send + Sync + 'static> Resolvable for T {
    #[inline]
    fn type_key() -> TypeKey {
        TypeKey::of::<T>()
    }
}

/// Marker for `dyn Trait` types usable as interface keys.
///
/// Never implemented by hand; see [`interface!`](crate::interface).
pub trait Interface: Resolvable {}

/// Key of an interface type.
#[inline]
pub fn interface_of<I: ?Sized + Interface>() -> TypeKey {
    TypeKey::interface::<I>()
}

/// Declare one or more traits as injectable interfaces.
///
/// The traits must have `Send + Sync` as supertraits. Values are bound with
/// [`Injector::map_to`](crate::Injector::map_to) or produced by providers
/// returning `Arc<dyn Trait>`, and requested as `Arc<dyn Trait>`.
///
/// ```rust
/// use std::sync::Arc;
/// use type_injector::{interface, Injector};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
/// interface!(Greeter);
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let injector = Injector::new();
/// injector.map_to::<dyn Greeter>(Arc::new(English));
///
/// let greeter = injector.resolve::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[macro_export]
macro_rules! interface {
    ($($iface:ident),+ $(,)?) => {
        $(
            impl $crate::Resolvable for dyn $iface {
                #[inline]
                fn type_key() -> $crate::TypeKey {
                    $crate::TypeKey::interface::<dyn $iface>()
                }
            }

            impl $crate::Interface for dyn $iface {}

            impl $crate::Constructible for dyn $iface {}
        )+
    };
}
