//! Error types for validated descriptors.
//!
//! Uses thiserror for structured errors with context. Every validation error
//! names the offending attribute and the constraint it failed, so that the
//! message alone is enough to tell a user what to fix.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Attribute name used in messages when a descriptor has not been bound yet.
pub const UNBOUND_ATTRIBUTE: &str = "value";

/// Top-level error type.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Descriptor configuration, binding or validation failure
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Record type or record failure
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON could not be parsed or produced
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a descriptor while it is configured, bound, read or written.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DescriptorError {
    /// The type specification cannot be used for runtime type checks.
    #[error("{type_spec} must be a type, a union of types, or a container of types: {reason}")]
    Configuration {
        /// Rendering of the offending type specification
        type_spec: String,
        /// Why it cannot be checked
        reason: String,
    },

    /// The value's runtime type is not a member of the declared type.
    #[error("{attribute} must be of type {expected} not {actual}")]
    TypeMismatch {
        /// Attribute the value was written to
        attribute: String,
        /// Declared type
        expected: String,
        /// Runtime type of the value
        actual: String,
    },

    /// The value passed the type check but failed a semantic validator.
    #[error("{attribute} must be {constraint}")]
    ValueConstraint {
        /// Attribute the value was written to
        attribute: String,
        /// What the validator requires
        constraint: String,
    },

    /// The attribute was read before any value was written to it.
    #[error("{attribute} has not been set")]
    AttributeMissing {
        /// Attribute that was read
        attribute: String,
    },

    /// The descriptor already has an attribute.
    #[error("descriptor is already bound to '{attribute}' on {owner}")]
    AlreadyBound {
        /// Attribute the descriptor is bound to
        attribute: String,
        /// Record type the descriptor is bound on
        owner: String,
    },

    /// The configuration supplied at bind time would produce unusable
    /// storage keys.
    #[error("cannot bind '{attribute}': {reason}")]
    InvalidBinding {
        /// Attribute the bind was for
        attribute: String,
        /// What is wrong with the configuration
        reason: String,
    },

    /// The descriptor was read or written before being bound.
    #[error("descriptor is not bound to an attribute")]
    Unbound,
}

/// Coarse classification of a [`DescriptorError`].
///
/// Configuration and type-mismatch errors are both type errors: the former
/// is about the declared type, the latter about the supplied value's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Wrong type, either declared or supplied
    Type,
    /// Right type, unacceptable value
    Value,
    /// Attribute lookup or binding problem
    Attribute,
}

/// Errors from the record layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The record type declares no such field.
    #[error("{record} has no field '{field}'")]
    UnknownField {
        /// Record type name
        record: String,
        /// Requested field
        field: String,
    },

    /// Two fields with the same name were declared.
    #[error("field '{field}' is declared twice on {record}")]
    DuplicateField {
        /// Record type name
        record: String,
        /// Repeated field
        field: String,
    },

    /// The record type was given a configuration it cannot bind fields with.
    #[error("{record} cannot be built: {reason}")]
    InvalidConfig {
        /// Record type name
        record: String,
        /// What is wrong with the configuration
        reason: String,
    },

    /// JSON input was not an object.
    #[error("{record} can only be built from a JSON object, got {actual}")]
    NotAnObject {
        /// Record type name
        record: String,
        /// Kind of the JSON value supplied
        actual: String,
    },

    /// A stored value could not be read as the requested Rust type.
    #[error("field '{field}' holds {actual}, which cannot be read as {expected}")]
    Conversion {
        /// Field that was read
        field: String,
        /// Requested type
        expected: String,
        /// Kind of the stored value
        actual: String,
    },

    /// A descriptor refused the operation.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Errors while loading descriptor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parsed but are not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Error Utilities
// ============================================================================

impl DescriptorError {
    /// Build a type mismatch error.
    pub fn type_mismatch(
        attribute: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        DescriptorError::TypeMismatch {
            attribute: attribute.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Build a value constraint error.
    pub fn value_constraint(attribute: impl Into<String>, constraint: impl Into<String>) -> Self {
        DescriptorError::ValueConstraint {
            attribute: attribute.into(),
            constraint: constraint.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DescriptorError::Configuration { .. } | DescriptorError::TypeMismatch { .. } => {
                ErrorKind::Type
            }
            DescriptorError::ValueConstraint { .. } => ErrorKind::Value,
            DescriptorError::AttributeMissing { .. }
            | DescriptorError::AlreadyBound { .. }
            | DescriptorError::InvalidBinding { .. }
            | DescriptorError::Unbound => ErrorKind::Attribute,
        }
    }

    /// Get the attribute this error refers to, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            DescriptorError::TypeMismatch { attribute, .. }
            | DescriptorError::ValueConstraint { attribute, .. }
            | DescriptorError::AttributeMissing { attribute }
            | DescriptorError::AlreadyBound { attribute, .. }
            | DescriptorError::InvalidBinding { attribute, .. } => Some(attribute),
            DescriptorError::Configuration { .. } | DescriptorError::Unbound => None,
        }
    }

    /// Whether the error was caused by the value handed to a write.
    ///
    /// These are the errors a caller can resolve by retrying with a
    /// corrected value.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DescriptorError::TypeMismatch { .. } | DescriptorError::ValueConstraint { .. }
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Type => write!(f, "type error"),
            ErrorKind::Value => write!(f, "value error"),
            ErrorKind::Attribute => write!(f, "attribute error"),
        }
    }
}

/// Result type alias for top-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for descriptor operations.
pub type DescriptorResult<T> = std::result::Result<T, DescriptorError>;

/// Result type alias for record operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
