//! Descriptor configuration.
//!
//! Controls how storage keys are derived when a descriptor is bound and
//! whether rejected writes are logged. Can be loaded from a TOML file:
//!
//! ```toml
//! storage_prefix = "__"
//! log_rejections = false
//! ```

use crate::core::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default prefix prepended to an attribute name to form its storage key.
pub const DEFAULT_STORAGE_PREFIX: &str = "_";

/// Settings applied to descriptors when they are bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorConfig {
    /// Prefix that turns a public attribute name into its storage key.
    pub storage_prefix: String,
    /// Log rejected writes at `warn` level.
    pub log_rejections: bool,
}

impl DescriptorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("loading descriptor configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Set the storage prefix.
    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    /// Enable or disable logging of rejected writes.
    pub fn with_log_rejections(mut self, enabled: bool) -> Self {
        self.log_rejections = enabled;
        self
    }

    /// Check the configuration for values that would break storage keys.
    ///
    /// An empty prefix would make the storage key equal to the public name.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "storage_prefix must not be empty".to_string(),
            ));
        }
        if self.storage_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "storage_prefix '{}' must not contain whitespace",
                self.storage_prefix
            )));
        }
        Ok(())
    }

    /// Derive the storage key for an attribute name.
    pub fn storage_key(&self, attribute_name: &str) -> String {
        format!("{}{}", self.storage_prefix, attribute_name)
    }
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            log_rejections: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DescriptorConfig::default();
        assert_eq!(config.storage_key("name"), "_name");
        assert!(config.log_rejections);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DescriptorConfig::from_toml_str("log_rejections = false").unwrap();
        assert_eq!(config.storage_prefix, "_");
        assert!(!config.log_rejections);
    }

    #[test]
    fn test_rejects_empty_prefix() {
        let err = DescriptorConfig::from_toml_str("storage_prefix = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = DescriptorConfig::from_toml_str("prefix = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "storage_prefix = \"__\"").unwrap();

        let config = DescriptorConfig::load(file.path()).unwrap();
        assert_eq!(config.storage_key("age"), "__age");
    }

    #[test]
    fn test_load_missing_file() {
        let err = DescriptorConfig::load("/nonexistent/descriptor.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
