//! The validated attribute descriptor.
//!
//! A descriptor guards one attribute of a host. Every write runs a type check
//! against the descriptor's [`TypeSpec`], then each [`Validator`] in order,
//! and stores the value on the host only when all of them pass. The
//! descriptor itself holds configuration only; values live on the host,
//! keyed by the storage key derived when the descriptor is bound.
//!
//! ```
//! use std::collections::HashMap;
//! use validated_descriptor::prelude::*;
//!
//! let mut name = ValidatedDescriptor::new(TypeSpec::String)?.with_validator(is_non_empty())?;
//! name.bind("Person", "name")?;
//!
//! let mut host: HashMap<String, Value> = HashMap::new();
//! name.write(&mut host, "John")?;
//! assert_eq!(name.read(&host)?, &Value::from("John"));
//! assert!(name.write(&mut host, "").is_err());
//! assert_eq!(name.read(&host)?, &Value::from("John"));
//! # Ok::<(), DescriptorError>(())
//! ```

use crate::config::DescriptorConfig;
use crate::core::error::{DescriptorError, DescriptorResult, UNBOUND_ATTRIBUTE};
use crate::core::types::{TypeSpec, Value};
use crate::core::validator::Validator;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// Backing storage of a host instance.
///
/// Values are addressed by storage key, never by public attribute name.
pub trait Storage {
    /// Get the value stored under `key`.
    fn load(&self, key: &str) -> Option<&Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn store(&mut self, key: &str, value: Value);
}

impl Storage for HashMap<String, Value> {
    fn load(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn store(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }
}

impl Storage for BTreeMap<String, Value> {
    fn load(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn store(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }
}

impl Storage for IndexMap<String, Value> {
    fn load(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn store(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }
}

/// Where a descriptor is attached. Set exactly once by [`ValidatedDescriptor::bind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Name of the owning record type
    pub owner: String,
    /// Public attribute name
    pub attribute_name: String,
    /// Key the host stores the value under
    pub storage_key: String,
    /// Log rejected writes
    pub log_rejections: bool,
}

/// Descriptor that validates every value written to one attribute.
#[derive(Debug, Clone, Default)]
pub struct ValidatedDescriptor {
    type_spec: TypeSpec,
    validators: Vec<Validator>,
    binding: Option<Binding>,
}

impl ValidatedDescriptor {
    /// Create a descriptor with no validators.
    ///
    /// Fails with [`DescriptorError::Configuration`] if `type_spec` cannot be
    /// checked at runtime.
    pub fn new(type_spec: TypeSpec) -> DescriptorResult<Self> {
        Self::with_validators(type_spec, Vec::new())
    }

    /// Create a descriptor with an ordered list of validators.
    ///
    /// The declared type and every type-check validator are verified here,
    /// so an unusable spec never reaches a write.
    pub fn with_validators(
        type_spec: TypeSpec,
        validators: impl IntoIterator<Item = Validator>,
    ) -> DescriptorResult<Self> {
        type_spec.ensure_checkable()?;
        let validators: Vec<Validator> = validators.into_iter().collect();
        validators.iter().try_for_each(Validator::ensure_checkable)?;
        Ok(Self {
            type_spec,
            validators,
            binding: None,
        })
    }

    /// Append a validator; it runs after the ones already configured.
    pub fn with_validator(mut self, validator: Validator) -> DescriptorResult<Self> {
        validator.ensure_checkable()?;
        self.validators.push(validator);
        Ok(self)
    }

    /// Get the declared type.
    pub fn type_spec(&self) -> &TypeSpec {
        &self.type_spec
    }

    /// Get the validators in the order they run.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Get the binding, if bound.
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Check if the descriptor has been bound to an attribute.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Get the public attribute name, if bound.
    pub fn attribute_name(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.attribute_name.as_str())
    }

    /// Get the storage key, if bound.
    pub fn storage_key(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.storage_key.as_str())
    }

    /// Get the owning record type name, if bound.
    pub fn owner(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.owner.as_str())
    }

    /// Bind this descriptor to `attribute_name` on `owner` using the default
    /// configuration.
    pub fn bind(&mut self, owner: &str, attribute_name: &str) -> DescriptorResult<()> {
        self.bind_with_config(owner, attribute_name, &DescriptorConfig::default())
    }

    /// Bind this descriptor to `attribute_name` on `owner`.
    ///
    /// A descriptor can be bound only once. The configuration is validated
    /// first; a prefix that would make the storage key collide with the
    /// public name leaves the descriptor unbound.
    pub fn bind_with_config(
        &mut self,
        owner: &str,
        attribute_name: &str,
        config: &DescriptorConfig,
    ) -> DescriptorResult<()> {
        if let Some(binding) = &self.binding {
            return Err(DescriptorError::AlreadyBound {
                attribute: binding.attribute_name.clone(),
                owner: binding.owner.clone(),
            });
        }
        config
            .validate()
            .map_err(|e| DescriptorError::InvalidBinding {
                attribute: attribute_name.to_string(),
                reason: e.to_string(),
            })?;

        let binding = Binding {
            owner: owner.to_string(),
            attribute_name: attribute_name.to_string(),
            storage_key: config.storage_key(attribute_name),
            log_rejections: config.log_rejections,
        };
        log::debug!(
            "bound {} descriptor to {}.{} (storage key '{}')",
            self.type_spec,
            binding.owner,
            binding.attribute_name,
            binding.storage_key
        );
        self.binding = Some(binding);
        Ok(())
    }

    fn bound(&self) -> DescriptorResult<&Binding> {
        self.binding.as_ref().ok_or(DescriptorError::Unbound)
    }

    fn display_name(&self) -> &str {
        self.attribute_name().unwrap_or(UNBOUND_ATTRIBUTE)
    }

    /// Check only that `value` is a member of the declared type.
    pub fn type_check(&self, value: &Value) -> DescriptorResult<()> {
        if self.type_spec.matches(value) {
            Ok(())
        } else {
            Err(DescriptorError::type_mismatch(
                self.display_name(),
                &self.type_spec,
                value.kind(),
            ))
        }
    }

    /// Run the type check and then every validator, without storing anything.
    ///
    /// Stops at the first failure.
    pub fn validate(&self, value: &Value) -> DescriptorResult<()> {
        self.type_check(value)?;
        let attribute = self.display_name();
        self.validators
            .iter()
            .try_for_each(|validator| validator.check(attribute, value))
    }

    /// Read the last value successfully written to `host`.
    pub fn read<'h, S: Storage + ?Sized>(&self, host: &'h S) -> DescriptorResult<&'h Value> {
        let binding = self.bound()?;
        host.load(&binding.storage_key)
            .ok_or_else(|| DescriptorError::AttributeMissing {
                attribute: binding.attribute_name.clone(),
            })
    }

    /// Validate `value` and store it on `host`.
    ///
    /// On failure `host` is left untouched.
    pub fn write<S: Storage + ?Sized>(
        &self,
        host: &mut S,
        value: impl Into<Value>,
    ) -> DescriptorResult<()> {
        let binding = self.bound()?;
        let value = value.into();

        if let Err(err) = self.validate(&value) {
            if binding.log_rejections {
                log::warn!(
                    "rejected write to {}.{}: {}",
                    binding.owner,
                    binding.attribute_name,
                    err
                );
            }
            return Err(err);
        }

        log::trace!("{}.{} = {}", binding.owner, binding.attribute_name, value);
        host.store(&binding.storage_key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::validator::{is_non_empty, is_positive, value_check};
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn bound(descriptor: ValidatedDescriptor, name: &str) -> ValidatedDescriptor {
        let mut descriptor = descriptor;
        descriptor.bind("TestRecord", name).unwrap();
        descriptor
    }

    #[test]
    fn test_new_stores_spec_and_empty_validators() {
        let descriptor = ValidatedDescriptor::new(TypeSpec::String).unwrap();
        assert_eq!(descriptor.type_spec(), &TypeSpec::String);
        assert!(descriptor.validators().is_empty());
        assert!(!descriptor.is_bound());
    }

    #[test]
    fn test_new_rejects_placeholder_eagerly() {
        let err = ValidatedDescriptor::new(TypeSpec::param("a")).unwrap_err();
        assert!(matches!(err, DescriptorError::Configuration { .. }));
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_default_accepts_anything() {
        let descriptor = ValidatedDescriptor::default();
        assert_eq!(descriptor.type_spec(), &TypeSpec::Any);
        assert!(descriptor.validate(&Value::None).is_ok());
    }

    #[test]
    fn test_bind_derives_storage_key() {
        let descriptor = bound(ValidatedDescriptor::default(), "name");
        assert_eq!(descriptor.attribute_name(), Some("name"));
        assert_eq!(descriptor.storage_key(), Some("_name"));
        assert_eq!(descriptor.owner(), Some("TestRecord"));
    }

    #[test]
    fn test_bind_with_config_prefix() {
        let mut descriptor = ValidatedDescriptor::default();
        let config = DescriptorConfig::default().with_storage_prefix("__");
        descriptor.bind_with_config("TestRecord", "age", &config).unwrap();
        assert_eq!(descriptor.storage_key(), Some("__age"));
    }

    #[test]
    fn test_bind_rejects_empty_storage_prefix() {
        let mut descriptor = ValidatedDescriptor::new(TypeSpec::Integer).unwrap();
        let config = DescriptorConfig::default().with_storage_prefix("");
        let err = descriptor.bind_with_config("TestRecord", "x", &config).unwrap_err();

        assert!(matches!(err, DescriptorError::InvalidBinding { .. }));
        assert_eq!(err.attribute(), Some("x"));
        assert!(err.to_string().contains("storage_prefix must not be empty"));
        assert!(!descriptor.is_bound());

        // A rejected bind does not use up the descriptor.
        descriptor.bind("TestRecord", "x").unwrap();
        assert_eq!(descriptor.storage_key(), Some("_x"));
    }

    #[test]
    fn test_validator_type_checks_rejected_eagerly() {
        let err = ValidatedDescriptor::with_validators(
            TypeSpec::Integer,
            [is_positive(), Validator::TypeCheck(TypeSpec::param("T"))],
        )
        .unwrap_err();
        assert!(matches!(err, DescriptorError::Configuration { .. }));

        let err = ValidatedDescriptor::new(TypeSpec::Any)
            .unwrap()
            .with_validator(Validator::TypeCheck(TypeSpec::array_of(TypeSpec::param("T"))))
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Configuration { .. }));

        let err = ValidatedDescriptor::new(TypeSpec::Any)
            .unwrap()
            .with_validator(Validator::TypeCheck(TypeSpec::Union(Vec::new())))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        let descriptor = ValidatedDescriptor::new(TypeSpec::Any)
            .unwrap()
            .with_validator(Validator::TypeCheck(TypeSpec::Integer))
            .unwrap();
        assert_eq!(descriptor.validators().len(), 1);
    }

    #[test]
    fn test_bind_twice_fails() {
        let mut descriptor = bound(ValidatedDescriptor::default(), "name");
        let err = descriptor.bind("Other", "alias").unwrap_err();
        assert!(matches!(err, DescriptorError::AlreadyBound { .. }));
        assert_eq!(descriptor.attribute_name(), Some("name"));
        assert_eq!(descriptor.owner(), Some("TestRecord"));
    }

    #[test]
    fn test_unbound_read_and_write_fail() {
        let descriptor = ValidatedDescriptor::default();
        let mut host: HashMap<String, Value> = HashMap::new();
        assert_eq!(descriptor.write(&mut host, 1), Err(DescriptorError::Unbound));
        assert_eq!(descriptor.read(&host), Err(DescriptorError::Unbound));
    }

    #[test]
    fn test_unbound_validate_uses_generic_name() {
        let descriptor = ValidatedDescriptor::new(TypeSpec::Integer).unwrap();
        let err = descriptor.validate(&"x".into()).unwrap_err();
        assert_eq!(err.to_string(), "value must be of type integer not string");
    }

    #[test]
    fn test_read_before_write_is_missing() {
        let descriptor = bound(ValidatedDescriptor::default(), "name");
        let host: HashMap<String, Value> = HashMap::new();
        let err = descriptor.read(&host).unwrap_err();
        assert_eq!(
            err,
            DescriptorError::AttributeMissing {
                attribute: "name".to_string()
            }
        );
    }

    #[test]
    fn test_write_stores_under_storage_key() {
        let descriptor = bound(ValidatedDescriptor::new(TypeSpec::String).unwrap(), "name");
        let mut host: BTreeMap<String, Value> = BTreeMap::new();
        descriptor.write(&mut host, "John").unwrap();
        assert_eq!(host.get("_name"), Some(&Value::from("John")));
        assert!(host.get("name").is_none());
    }

    #[test]
    fn test_type_mismatch_leaves_host_unchanged() {
        init_logging();
        let descriptor = bound(ValidatedDescriptor::new(TypeSpec::Real).unwrap(), "age");
        let mut host: HashMap<String, Value> = HashMap::new();
        descriptor.write(&mut host, 30.0).unwrap();

        let err = descriptor.write(&mut host, "30.0").unwrap_err();
        assert_eq!(
            err,
            DescriptorError::TypeMismatch {
                attribute: "age".to_string(),
                expected: "real number".to_string(),
                actual: "string".to_string(),
            }
        );
        assert_eq!(descriptor.read(&host).unwrap(), &Value::Float(30.0));
    }

    #[test]
    fn test_validator_failure_leaves_host_unchanged() {
        init_logging();
        let descriptor = bound(
            ValidatedDescriptor::with_validators(TypeSpec::String, [is_non_empty()]).unwrap(),
            "name",
        );
        let mut host: IndexMap<String, Value> = IndexMap::new();
        descriptor.write(&mut host, "John").unwrap();

        let err = descriptor.write(&mut host, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(err.to_string().contains("non-empty"));
        assert_eq!(descriptor.read(&host).unwrap(), &Value::from("John"));
    }

    #[test]
    fn test_validators_skipped_after_type_failure() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let descriptor = ValidatedDescriptor::new(TypeSpec::Integer)
            .unwrap()
            .with_validator(value_check(
                move |_| {
                    *counter.lock().unwrap() += 1;
                    true
                },
                "counted",
            ))
            .unwrap();

        assert!(descriptor.validate(&"x".into()).is_err());
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(descriptor.validate(&Value::Integer(1)).is_ok());
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_first_failing_validator_is_reported() {
        let descriptor = bound(
            ValidatedDescriptor::new(TypeSpec::Integer)
                .unwrap()
                .with_validator(value_check(|v| v.as_integer() != Some(7), "not seven"))
                .unwrap()
                .with_validator(is_positive())
                .unwrap(),
            "n",
        );
        let err = descriptor.validate(&Value::Integer(-7)).unwrap_err();
        assert_eq!(err.to_string(), "n must be positive");

        let descriptor = bound(
            ValidatedDescriptor::new(TypeSpec::Integer)
                .unwrap()
                .with_validator(is_positive())
                .unwrap()
                .with_validator(value_check(|v| v.as_integer() != Some(-7), "not minus seven"))
                .unwrap(),
            "n",
        );
        let err = descriptor.validate(&Value::Integer(-7)).unwrap_err();
        assert_eq!(err.to_string(), "n must be positive");
    }

    #[test]
    fn test_positive_scenario() {
        let descriptor = bound(
            ValidatedDescriptor::with_validators(TypeSpec::Real, [is_positive()]).unwrap(),
            "count",
        );
        let mut host: HashMap<String, Value> = HashMap::new();
        let err = descriptor.write(&mut host, -1).unwrap_err();
        assert_eq!(err.to_string(), "count must be positive");
        assert!(descriptor.read(&host).is_err());

        descriptor.write(&mut host, 5).unwrap();
        assert_eq!(descriptor.read(&host).unwrap(), &Value::Integer(5));
    }

    #[test]
    fn test_rejections_not_logged_when_disabled() {
        let mut descriptor = ValidatedDescriptor::new(TypeSpec::Boolean).unwrap();
        let config = DescriptorConfig::default().with_log_rejections(false);
        descriptor.bind_with_config("TestRecord", "flag", &config).unwrap();
        assert!(!descriptor.binding().unwrap().log_rejections);

        let mut host: HashMap<String, Value> = HashMap::new();
        assert!(descriptor.write(&mut host, 1).is_err());
    }

    fn leaf_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::Integer),
            (-1.0e9f64..1.0e9).prop_map(Value::Float),
            ".{0,8}".prop_map(Value::String),
            any::<bool>().prop_map(Value::Boolean),
            Just(Value::None),
        ]
    }

    fn positive_real() -> ValidatedDescriptor {
        bound(
            ValidatedDescriptor::with_validators(TypeSpec::Real, [is_positive()]).unwrap(),
            "amount",
        )
    }

    proptest! {
        /// A write either succeeds and reads back exactly, or fails and
        /// leaves the previous value in place.
        #[test]
        fn write_commits_all_or_nothing(value in leaf_value()) {
            let descriptor = positive_real();
            let mut host: HashMap<String, Value> = HashMap::new();
            descriptor.write(&mut host, 1).unwrap();

            match descriptor.write(&mut host, value.clone()) {
                Ok(()) => prop_assert_eq!(descriptor.read(&host).unwrap(), &value),
                Err(err) => {
                    prop_assert!(err.is_rejection());
                    prop_assert_eq!(descriptor.read(&host).unwrap(), &Value::Integer(1));
                }
            }
        }

        /// Type failures are reported before any validator runs.
        #[test]
        fn non_reals_are_type_mismatches(s in ".{0,8}") {
            let descriptor = positive_real();
            let err = descriptor.validate(&Value::String(s)).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::Type);
        }

        /// Writing the same valid value twice is harmless.
        #[test]
        fn repeated_writes_are_idempotent(n in 1i64..i64::MAX) {
            let descriptor = positive_real();
            let mut host: HashMap<String, Value> = HashMap::new();
            prop_assert!(descriptor.write(&mut host, n).is_ok());
            prop_assert!(descriptor.write(&mut host, n).is_ok());
            prop_assert_eq!(descriptor.read(&host).unwrap(), &Value::Integer(n));
            prop_assert_eq!(host.len(), 1);
        }
    }
}
