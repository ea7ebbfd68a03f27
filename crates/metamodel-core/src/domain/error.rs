// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Domain errors are raised while interpreting raw element descriptions and
/// layout documents. Problems a facet factory can recover from are recorded
/// as validation findings instead and never surface as a `DomainError`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Parse Errors
    // ========================================================================
    #[error("invalid {kind} '{value}' (expected one of: {expected})")]
    InvalidValue {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("attribute '{attribute}' has the wrong shape: expected {expected}")]
    InvalidAttribute {
        attribute: String,
        expected: &'static str,
    },

    #[error("invalid type reference '{0}'")]
    InvalidTypeRef(String),

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("invalid member order sequence '{0}'")]
    InvalidSequence(String),

    // ========================================================================
    // Layout Errors
    // ========================================================================
    #[error("layout for '{type_name}' could not be parsed: {reason}")]
    LayoutParse { type_name: String, reason: String },

    #[error("layout for '{type_name}' is invalid: {reason}")]
    InvalidLayout { type_name: String, reason: String },

    // ========================================================================
    // Programming Model Errors
    // ========================================================================
    #[error("facet factory '{id}' is registered twice")]
    DuplicateFactory { id: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidValue { kind, expected, .. } => vec![
                format!("Use one of the accepted {kind} values: {expected}"),
                "Underscores and hyphens are interchangeable".into(),
            ],
            Self::InvalidAttribute { attribute, expected } => vec![
                format!("Attribute '{attribute}' must be {expected}"),
                "Check the class manifest".into(),
            ],
            Self::InvalidTypeRef(_) => vec![
                "Type references look like 'Order', 'list<Order>', 'set<Order>' or '[Order]'".into(),
            ],
            Self::InvalidRegex { reason, .. } => vec![
                format!("Regex error: {reason}"),
                "Patterns use the syntax of the `regex` crate".into(),
            ],
            Self::InvalidSequence(_) => vec![
                "Sequences are dot-separated numbers, e.g. '1', '2.1', '10.2.3'".into(),
            ],
            Self::LayoutParse { type_name, .. } => vec![
                format!("Fix or remove {type_name}.layout.json"),
                "The type is still loaded with its default layout".into(),
            ],
            Self::InvalidLayout { reason, .. } => vec![
                format!("Layout problem: {reason}"),
                "Column spans must be between 1 and 12".into(),
            ],
            Self::DuplicateFactory { id } => vec![
                format!("Remove the second registration of '{id}'"),
                "Each factory id may appear once per programming model".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidValue { .. }
            | Self::InvalidAttribute { .. }
            | Self::InvalidTypeRef(_)
            | Self::InvalidRegex { .. }
            | Self::InvalidSequence(_)
            | Self::InvalidLayout { .. } => ErrorCategory::Validation,
            Self::LayoutParse { .. } => ErrorCategory::Validation,
            Self::DuplicateFactory { .. } => ErrorCategory::Configuration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}
