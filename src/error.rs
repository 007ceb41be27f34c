//! Error types for dependency injection

use crate::{Resolvable, TypeKey};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while resolving, invoking or constructing.
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// Nothing is bound, provided or inherited under the key
    #[error("Value not found for type {type_name}")]
    ValueNotFound {
        type_name: &'static str,
        key: TypeKey,
    },

    /// A parameter of an invoked function or provider could not be resolved
    #[error("Missing dependency {type_name}: {source}")]
    MissingDependency {
        type_name: &'static str,
        source: Box<DiError>,
    },

    /// A provider returned its trailing error
    #[error("Failed to create {type_name}: {reason}")]
    CreationFailed {
        type_name: &'static str,
        reason: String,
    },

    /// No provider and no injectable fields to fall back on
    #[error("Type {type_name} has no provider and cannot be bound field by field")]
    NotConstructible { type_name: &'static str },

    /// A concrete key was used where an interface key is required
    #[error("{type_name} is not an interface type")]
    InvalidInterfaceMarker { type_name: &'static str },

    /// A value stored under a key does not hold the requested type
    #[error("Value of type {found} cannot be read as {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// One or more deferred targets failed during `finish_construct`
    #[error(transparent)]
    Finalize(#[from] FinalizeErrors),
}

impl DiError {
    /// Create a ValueNotFound error for a key
    #[inline]
    pub fn not_found(key: TypeKey) -> Self {
        Self::ValueNotFound {
            type_name: key.name(),
            key,
        }
    }

    /// Wrap a resolution failure of a parameter
    #[inline]
    pub fn missing(key: TypeKey, source: DiError) -> Self {
        Self::MissingDependency {
            type_name: key.name(),
            source: Box::new(source),
        }
    }

    /// Create a CreationFailed error
    #[inline]
    pub fn creation_failed<T: ?Sized + Resolvable>(reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            type_name: T::type_key().name(),
            reason: reason.into(),
        }
    }

    /// Create a NotConstructible error
    #[inline]
    pub fn not_constructible<T: ?Sized + Resolvable>() -> Self {
        Self::NotConstructible {
            type_name: T::type_key().name(),
        }
    }

    /// Name of the type the error is about, when there is exactly one
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::ValueNotFound { type_name, .. }
            | Self::MissingDependency { type_name, .. }
            | Self::CreationFailed { type_name, .. }
            | Self::NotConstructible { type_name }
            | Self::InvalidInterfaceMarker { type_name } => Some(*type_name),
            Self::TypeMismatch { expected, .. } => Some(*expected),
            Self::Finalize(_) => None,
        }
    }
}

/// Every per-target failure of one `finish_construct` pass, in queue order.
#[derive(Debug, Clone, Default)]
pub struct FinalizeErrors {
    errors: Vec<DiError>,
}

impl FinalizeErrors {
    pub(crate) fn new(errors: Vec<DiError>) -> Self {
        Self { errors }
    }

    /// The individual failures
    pub fn errors(&self) -> &[DiError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_inner(self) -> Vec<DiError> {
        self.errors
    }
}

impl fmt::Display for FinalizeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} deferred target(s) failed to construct", self.errors.len())?;
        for (i, err) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FinalizeErrors {}

impl<'a> IntoIterator for &'a FinalizeErrors {
    type Item = &'a DiError;
    type IntoIter = std::slice::Iter<'a, DiError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_type() {
        let err = DiError::not_found(TypeKey::of::<String>());
        let name = std::any::type_name::<String>();
        assert_eq!(err.to_string(), format!("Value not found for type {name}"));
        assert_eq!(err.type_name(), Some(name));
    }

    #[test]
    fn test_missing_dependency_keeps_source() {
        let inner = DiError::not_found(TypeKey::of::<u32>());
        let err = DiError::missing(TypeKey::of::<u32>(), inner);

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "Value not found for type u32");
    }

    #[test]
    fn test_finalize_errors_display() {
        let errors = FinalizeErrors::new(vec![
            DiError::not_constructible::<u8>(),
            DiError::not_found(TypeKey::of::<u16>()),
        ]);

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "2 deferred target(s) failed to construct: \
             Type u8 has no provider and cannot be bound field by field; \
             Value not found for type u16"
        );

        let wrapped: DiError = errors.into();
        assert!(matches!(wrapped, DiError::Finalize(ref e) if e.len() == 2));
        assert_eq!(wrapped.type_name(), None);
    }
}
