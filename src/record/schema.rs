//! Record types: the set of descriptor fields shared by all records of a kind.

use crate::config::DescriptorConfig;
use crate::core::descriptor::ValidatedDescriptor;
use crate::core::error::{Error, RecordError, RecordResult};
use crate::core::types::Value;
use crate::record::field::{Field, FromValue};
use crate::record::instance::Record;
use indexmap::IndexMap;
use std::sync::Arc;

/// A named set of validated fields.
///
/// Built once through [`RecordTypeBuilder`], which binds every descriptor to
/// its field name, and then shared by every [`Record`] of this type.
#[derive(Debug)]
pub struct RecordType {
    name: String,
    fields: IndexMap<String, ValidatedDescriptor>,
    config: DescriptorConfig,
}

/// Builder for [`RecordType`].
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    fields: Vec<(String, ValidatedDescriptor)>,
    config: DescriptorConfig,
}

impl RecordTypeBuilder {
    /// Declare a field governed by `descriptor`.
    pub fn field(mut self, name: impl Into<String>, descriptor: ValidatedDescriptor) -> Self {
        self.fields.push((name.into(), descriptor));
        self
    }

    /// Use `config` when binding the fields.
    pub fn with_config(mut self, config: DescriptorConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind every field and finish the record type.
    ///
    /// Fails if the configuration is unusable, even when no fields are
    /// declared.
    pub fn build(self) -> RecordResult<Arc<RecordType>> {
        self.config
            .validate()
            .map_err(|e| RecordError::InvalidConfig {
                record: self.name.clone(),
                reason: e.to_string(),
            })?;

        let mut fields = IndexMap::with_capacity(self.fields.len());

        for (field_name, mut descriptor) in self.fields {
            if fields.contains_key(&field_name) {
                return Err(RecordError::DuplicateField {
                    record: self.name,
                    field: field_name,
                });
            }
            descriptor.bind_with_config(&self.name, &field_name, &self.config)?;
            fields.insert(field_name, descriptor);
        }

        log::debug!("defined record type {} with {} field(s)", self.name, fields.len());

        Ok(Arc::new(RecordType {
            name: self.name,
            fields,
            config: self.config,
        }))
    }
}

impl RecordType {
    /// Start defining a record type.
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
            config: DescriptorConfig::default(),
        }
    }

    /// Get the type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the configuration the fields were bound with.
    pub fn config(&self) -> &DescriptorConfig {
        &self.config
    }

    /// Get the descriptor for a field.
    pub fn descriptor(&self, field: &str) -> Option<&ValidatedDescriptor> {
        self.fields.get(field)
    }

    /// Get the descriptor for a field, or an unknown-field error.
    pub(crate) fn require(&self, field: &str) -> RecordResult<&ValidatedDescriptor> {
        self.fields.get(field).ok_or_else(|| RecordError::UnknownField {
            record: self.name.clone(),
            field: field.to_string(),
        })
    }

    /// Iterate over field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over fields and their descriptors in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ValidatedDescriptor)> {
        self.fields.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// Number of declared fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Get a typed accessor for a field.
    pub fn field<T: FromValue + Into<Value>>(&self, name: &str) -> RecordResult<Field<T>> {
        self.require(name)?;
        Ok(Field::new(name))
    }

    /// Create a record with no fields set.
    pub fn instantiate(self: &Arc<Self>) -> Record {
        Record::new(Arc::clone(self))
    }

    /// Create a record and set the given fields, in order.
    ///
    /// Fails on the first unknown or invalid field.
    pub fn construct<K, V>(
        self: &Arc<Self>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> RecordResult<Record>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut record = self.instantiate();
        for (field, value) in values {
            record.set(field.as_ref(), value)?;
        }
        Ok(record)
    }

    /// Create a record from a JSON object.
    pub fn from_json(self: &Arc<Self>, json: serde_json::Value) -> RecordResult<Record> {
        match json {
            serde_json::Value::Object(object) => {
                self.construct(object.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
            other => Err(RecordError::NotAnObject {
                record: self.name.clone(),
                actual: Value::from(other).kind().to_string(),
            }),
        }
    }

    /// Create a record from JSON text.
    pub fn from_json_str(self: &Arc<Self>, text: &str) -> Result<Record, Error> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(self.from_json(json)?)
    }
}
