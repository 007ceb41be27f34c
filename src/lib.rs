//! # type-injector - Type-keyed dependency injection
//!
//! An [`Injector`] stores values by type, runs provider functions on demand,
//! calls functions with their parameters filled in, fills the tagged fields
//! of structs, and falls back to a parent injector for anything it cannot
//! supply itself.
//!
//! ## Features
//!
//! - 🔑 **Type keys** - values are found by concrete type or by `dyn Trait`
//!   interface, never by name
//! - 🏭 **Providers** - plain functions whose parameters are resolved first;
//!   their output is bound on first use
//! - 📞 **Invoke** - call any function with up to 8 injected parameters
//! - 🧩 **Struct binding** - `#[derive(Inject)]` fills `#[inject]` fields
//! - ⏳ **Two-phase construction** - request a value now, build it once
//!   everything it needs has been bound
//! - 🌳 **Parent chain** - child injectors see their parent's bindings
//! - 📊 **Observable** - optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use type_injector::{interface, Injector};
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//! interface!(Clock);
//!
//! struct Fixed(u64);
//! impl Clock for Fixed {
//!     fn now(&self) -> u64 { self.0 }
//! }
//!
//! struct Scheduler {
//!     clock: Arc<dyn Clock>,
//!     name: Arc<String>,
//! }
//!
//! let injector = Injector::new();
//! injector
//!     .map(String::from("nightly"))
//!     .map_to::<dyn Clock>(Arc::new(Fixed(1_700_000_000)))
//!     .provide(|clock: Arc<dyn Clock>, name: Arc<String>| Arc::new(Scheduler { clock, name }));
//!
//! let next = injector
//!     .invoke(|s: Arc<Scheduler>| format!("{} at {}", s.name, s.clock.now()))
//!     .unwrap();
//! assert_eq!(next, "nightly at 1700000000");
//! ```
//!
//! ## Struct binding
//!
//! ```rust
//! # #[cfg(feature = "derive")]
//! # {
//! use std::sync::Arc;
//! use type_injector::{Inject, Injector};
//!
//! struct Database { url: String }
//!
//! #[derive(Inject, Default)]
//! struct Handler {
//!     #[inject]
//!     db: Option<Arc<Database>>,
//!     #[inject(optional)]
//!     audit: Option<Arc<u64>>,
//!     hits: u32,
//! }
//!
//! let injector = Injector::new();
//! injector.map(Database { url: "sqlite::memory:".into() });
//!
//! let mut handler = Handler { hits: 3, ..Default::default() };
//! injector.apply(&mut handler).unwrap();
//!
//! assert_eq!(handler.db.unwrap().url, "sqlite::memory:");
//! assert!(handler.audit.is_none());
//! assert_eq!(handler.hits, 3);
//! # }
//! ```
//!
//! ## Scoped injectors
//!
//! ```rust
//! use type_injector::{Injector, TypeKey};
//!
//! struct AppConfig { name: String }
//! struct RequestId(u64);
//!
//! let root = Injector::new();
//! root.map(AppConfig { name: "app".into() });
//!
//! let request = root.child();
//! request.map(RequestId(7));
//!
//! assert_eq!(request.resolve::<AppConfig>().unwrap().name, "app");
//! assert!(root.get(TypeKey::of::<RequestId>()).is_none());
//! ```

extern crate self as type_injector;

mod apply;
mod deferred;
mod dependency;
mod error;
pub mod global;
mod injector;
mod invoke;
mod key;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod storage;

pub use apply::{Constructible, Inject};
pub use deferred::Deferred;
pub use dependency::Dependency;
pub use error::*;
pub use injector::Injector;
pub use invoke::{Invocable, dependencies_of};
pub use key::{Interface, Resolvable, TypeKey, interface_of};
pub use provider::{Output, Provider};
pub use storage::Value;

#[cfg(feature = "derive")]
pub use type_injector_derive::Inject;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

pub use std::sync::Arc;

#[doc(hidden)]
pub mod __private {
    pub use crate::dependency::resolve_param as resolve_field;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Constructible, Deferred, DiError, Inject, Injector, Interface, Resolvable, Result,
        TypeKey, Value, interface,
    };
    pub use std::sync::Arc;
}
