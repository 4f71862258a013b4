//! Core types for validated attributes.
//!
//! This module contains:
//! - Runtime values and type specifications
//! - Validators and the factories that build them
//! - The validated descriptor and the storage trait hosts implement
//! - Error types

pub mod descriptor;
pub mod error;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use descriptor::{Binding, Storage, ValidatedDescriptor};
pub use error::{ConfigError, DescriptorError, Error, ErrorKind, RecordError};
pub use types::{TypeSpec, Value, ValueKind};
pub use validator::Validator;
