//! Application layer errors.
//!
//! These errors represent failures while loading and assembling
//! specifications, not malformed descriptions. Those are `DomainError`s
//! from `crate::domain` or, when recoverable, validation findings.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during specification loading and context setup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The class source knows nothing about the type.
    #[error("No class description for '{type_name}'")]
    ClassNotFound { type_name: String },

    /// The persistence filter excludes the type from the metamodel.
    #[error("Type '{type_name}' is ignored by the persistence filter")]
    IgnoredType { type_name: String },

    /// A superclass chain loops back onto itself.
    #[error("Inheritance cycle: {chain}")]
    HierarchyCycle { type_name: String, chain: String },

    /// A shared cache lock was poisoned by a panicking thread.
    #[error("Lock poisoned: {resource}")]
    LockPoisoned { resource: &'static str },

    /// Port/Adapter not configured.
    #[error("Required adapter not configured: {name}")]
    AdapterNotConfigured { name: &'static str },

    /// A context singleton was registered twice.
    #[error("{name} registered more than once")]
    DuplicateRegistration { name: &'static str },

    /// The class source failed while reading descriptions.
    #[error("Class source failed: {reason}")]
    ClassSourceFailed { reason: String },

    /// The layout resource exists but could not be read.
    #[error("Layout resource for '{type_name}' could not be read: {reason}")]
    LayoutResourceFailed { type_name: String, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ClassNotFound { type_name } => vec![
                format!("Add a class manifest for '{type_name}'"),
                "Try: metamodel list to see the known types".into(),
            ],
            Self::IgnoredType { type_name } => vec![
                format!("'{type_name}' matches a synthetic-type rule of the persistence filter"),
                "Check [persistence] proxy_class_suffixes in the configuration".into(),
            ],
            Self::HierarchyCycle { type_name, .. } => vec![
                format!("Break the superclass cycle through '{type_name}'"),
            ],
            Self::LockPoisoned { .. } => vec![
                "A previous load panicked while holding the cache".into(),
                "Clear the metamodel context and try again".into(),
            ],
            Self::AdapterNotConfigured { name } => vec![
                format!("Required component not configured: {name}"),
                "This is likely a configuration error".into(),
            ],
            Self::DuplicateRegistration { name } => {
                vec![format!("Register the {name} exactly once")]
            }
            Self::ClassSourceFailed { .. } => vec![
                "Check that the classes directory exists and is readable".into(),
            ],
            Self::LayoutResourceFailed { type_name, .. } => vec![
                format!("Check permissions of {type_name}.layout.json"),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ClassNotFound { .. } | Self::IgnoredType { .. } => ErrorCategory::NotFound,
            Self::HierarchyCycle { .. } => ErrorCategory::Validation,
            Self::LockPoisoned { .. }
            | Self::ClassSourceFailed { .. }
            | Self::LayoutResourceFailed { .. } => ErrorCategory::Internal,
            Self::AdapterNotConfigured { .. } | Self::DuplicateRegistration { .. } => {
                ErrorCategory::Configuration
            }
        }
    }
}
