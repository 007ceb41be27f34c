//! Two-phase construction
//!
//! `construct_later` hands out a [`Deferred`] slot and records a pending
//! target; `finish_construct` builds every pending target in enqueue order.

use crate::apply::Constructible;
use crate::{DiError, FinalizeErrors, Injector, Result, TypeKey};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// A value slot reserved for two-phase construction.
///
/// Empty until the owning injector's `finish_construct` builds the target;
/// stays empty if that fails. Clones share the same slot.
///
/// ```rust
/// use std::sync::Arc;
/// use type_injector::{Constructible, Injector};
///
/// struct Config { port: u16 }
/// impl Constructible for Config {}
///
/// let injector = Injector::new();
/// let config = injector.construct_later::<Config>();
/// assert!(config.get().is_none());
///
/// // Bindings may arrive after the target was requested
/// injector.provide(|| Arc::new(Config { port: 8080 }));
///
/// injector.finish_construct().unwrap();
/// assert_eq!(config.get().unwrap().port, 8080);
/// ```
pub struct Deferred<T: ?Sized> {
    slot: Arc<OnceCell<Arc<T>>>,
}

impl<T: ?Sized> Deferred<T> {
    fn new() -> Self {
        Self {
            slot: Arc::new(OnceCell::new()),
        }
    }

    /// The constructed value, once finalized
    #[inline]
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.get().cloned()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T: ?Sized> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("type", &std::any::type_name::<T>())
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// A queued construction record with its target type erased.
trait PendingTarget: Send + Sync {
    fn key(&self) -> TypeKey;

    /// Build the target and fill its slot.
    fn finish(&self, injector: &Injector) -> Result<()>;
}

struct Pending<T: ?Sized> {
    slot: Arc<OnceCell<Arc<T>>>,
}

impl<T: ?Sized + Constructible> PendingTarget for Pending<T> {
    fn key(&self) -> TypeKey {
        T::type_key()
    }

    fn finish(&self, injector: &Injector) -> Result<()> {
        if self.slot.get().is_some() {
            return Ok(());
        }
        let built = injector.construct::<T>()?;
        // Only finish_construct fills slots and it drains the queue first,
        // so the slot is still empty here.
        let _ = self.slot.set(built);
        Ok(())
    }
}

/// Pending construction targets, in enqueue order.
pub(crate) struct DeferredQueue {
    pending: Mutex<Vec<Box<dyn PendingTarget>>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Record a target and return its (empty) slot.
    pub fn enqueue<T: ?Sized + Constructible>(&self) -> Deferred<T> {
        let deferred = Deferred::new();
        self.pending.lock().push(Box::new(Pending::<T> {
            slot: Arc::clone(&deferred.slot),
        }));

        #[cfg(feature = "logging")]
        trace!(
            target: "type_injector",
            service = T::type_key().name(),
            "Queued deferred construction"
        );

        deferred
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn keys(&self) -> Vec<TypeKey> {
        self.pending.lock().iter().map(|target| target.key()).collect()
    }

    /// Build every queued target once.
    ///
    /// Failures do not stop the pass: every target is attempted and all
    /// failures come back together. Successful targets leave the queue;
    /// failed ones stay queued, ahead of anything enqueued during the pass,
    /// so a later call retries them.
    pub fn finish(&self, injector: &Injector) -> Result<()> {
        // Take the batch out so targets may enqueue more work while building.
        let batch = std::mem::take(&mut *self.pending.lock());
        if batch.is_empty() {
            return Ok(());
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "type_injector",
            targets = batch.len(),
            "Finishing deferred construction"
        );

        let mut failed = Vec::new();
        let mut errors: Vec<DiError> = Vec::new();
        for target in batch {
            if let Err(err) = target.finish(injector) {
                #[cfg(feature = "logging")]
                debug!(
                    target: "type_injector",
                    service = target.key().name(),
                    error = %err,
                    "Deferred target failed to construct"
                );

                errors.push(err);
                failed.push(target);
            }
        }

        if errors.is_empty() {
            return Ok(());
        }

        let mut pending = self.pending.lock();
        failed.append(&mut *pending);
        *pending = failed;

        Err(FinalizeErrors::new(errors).into())
    }
}

impl Default for DeferredQueue {
    fn default() -> Self {
        Self::new()
    }
}
