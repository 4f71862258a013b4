//! Record instances: the hosts that hold validated values.

use crate::core::error::RecordResult;
use crate::core::types::Value;
use crate::record::schema::RecordType;
use indexmap::IndexMap;
use std::sync::Arc;

/// One record of a [`RecordType`].
///
/// Values are kept under each field's storage key and can only be changed
/// through the field's descriptor, so every stored value has passed
/// validation.
#[derive(Debug, Clone)]
pub struct Record {
    record_type: Arc<RecordType>,
    slots: IndexMap<String, Value>,
}

impl Record {
    pub(crate) fn new(record_type: Arc<RecordType>) -> Self {
        Self {
            record_type,
            slots: IndexMap::new(),
        }
    }

    /// Get the record's type.
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Read a field.
    ///
    /// Fails if the field is unknown or has never been set.
    pub fn get(&self, field: &str) -> RecordResult<&Value> {
        let descriptor = self.record_type.require(field)?;
        Ok(descriptor.read(&self.slots)?)
    }

    /// Validate and write a field. On failure the record is unchanged.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> RecordResult<()> {
        let descriptor = self.record_type.require(field)?;
        descriptor.write(&mut self.slots, value)?;
        Ok(())
    }

    /// Check if a field has been set.
    pub fn is_set(&self, field: &str) -> bool {
        self.record_type
            .descriptor(field)
            .and_then(|d| d.storage_key())
            .is_some_and(|key| self.slots.contains_key(key))
    }

    /// Iterate over set fields by public name, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        let slots = &self.slots;
        self.record_type
            .fields()
            .filter_map(move |(name, descriptor)| descriptor.read(slots).ok().map(|v| (name, v)))
    }

    /// Snapshot the set fields as a JSON object keyed by public name.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }
}
