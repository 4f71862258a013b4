//! # validated-descriptor - Validated Attributes
//!
//! Descriptors that guard the attributes of a record: every write is type
//! checked and run through an ordered list of validators, and only values
//! that pass every check are stored.
//!
//! ## Features
//!
//! - **Fail-fast type specs**: a descriptor refuses a type expression it
//!   cannot check at runtime when it is created, not on first use
//! - **Ordered validators**: reusable checks (`is_positive`, `is_non_empty`,
//!   ranges, lengths, patterns) plus closures, run in declaration order
//! - **All-or-nothing writes**: a rejected value never reaches storage
//! - **Typed access**: `Field<T>` accessors over dynamically typed records
//!
//! ## Quick Start
//!
//! ```rust
//! use validated_descriptor::prelude::*;
//!
//! let person = RecordType::builder("Person")
//!     .field("name", ValidatedDescriptor::with_validators(TypeSpec::String, [is_non_empty()])?)
//!     .field("age", ValidatedDescriptor::new(TypeSpec::Real)?.with_validator(is_positive())?)
//!     .build()?;
//!
//! let mut john = person.construct([("name", Value::from("John")), ("age", Value::from(30.0))])?;
//! assert_eq!(john.get("name")?, &Value::from("John"));
//!
//! // Rejected writes leave the record untouched.
//! assert!(john.set("age", "30.0").is_err());
//! assert!(john.set("name", "").is_err());
//! assert_eq!(john.get("age")?, &Value::Float(30.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: values, type specs, validators, the descriptor, and errors
//! - [`record`]: record types that bind descriptors to fields, and records
//!   that hold the validated values
//! - [`config`]: storage-key and logging settings applied at bind time

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod record;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust
/// use validated_descriptor::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{TypeSpec, Value, ValueKind};

    // Descriptor
    pub use crate::core::descriptor::{Binding, Storage, ValidatedDescriptor};

    // Validators
    pub use crate::core::validator::{
        is_bool, is_integer, is_non_empty, is_non_negative, is_positive, is_real, is_string,
        type_check, value_check, Validator,
    };

    // Errors
    pub use crate::core::error::{ConfigError, DescriptorError, Error, ErrorKind, RecordError};

    // Records
    pub use crate::record::{Field, FromValue, Record, RecordType, RecordTypeBuilder};

    // Configuration
    pub use crate::config::DescriptorConfig;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
