//! Record types and instances built from validated descriptors.
//!
//! A [`RecordType`] plays the role of a class whose attributes are guarded
//! by descriptors: declaring a field binds its descriptor once, and every
//! [`Record`] of that type routes reads and writes through it.

pub mod field;
pub mod instance;
pub mod schema;

pub use field::{Field, FromValue};
pub use instance::Record;
pub use schema::{RecordType, RecordTypeBuilder};
