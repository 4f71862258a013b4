//! Typed accessors for record fields.
//!
//! A [`Field<T>`] is a get/set pair bound to one field name. Writes still go
//! through the field's descriptor; reads convert the stored [`Value`] into `T`.

use crate::core::error::{RecordError, RecordResult};
use crate::core::types::Value;
use crate::record::instance::Record;
use std::fmt;
use std::marker::PhantomData;

/// Conversion out of a stored [`Value`].
pub trait FromValue: Sized {
    /// Name of the target type used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Convert, or `None` if the value has the wrong shape.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer()
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "real number";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_real()
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for Vec<Value> {
    const TYPE_NAME: &'static str = "array";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_array().cloned()
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// Typed accessor bound to one field of a record type.
pub struct Field<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            _marker: PhantomData,
        }
    }

    /// Get the field name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: FromValue + Into<Value>> Field<T> {
    /// Read the field from `record` as `T`.
    pub fn get(&self, record: &Record) -> RecordResult<T> {
        let value = record.get(&self.name)?;
        T::from_value(value).ok_or_else(|| RecordError::Conversion {
            field: self.name.clone(),
            expected: T::TYPE_NAME.to_string(),
            actual: value.kind().to_string(),
        })
    }

    /// Validate and write `value` to the field on `record`.
    pub fn set(&self, record: &mut Record, value: T) -> RecordResult<()> {
        record.set(&self.name, value)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self::new(&self.name)
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
