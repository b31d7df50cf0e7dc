//! The root configuration type.

use serde::{Deserialize, Serialize};

use crate::{AppConfig, ConfigError, ContractConfig, LogFormat, LoggingConfig};

/// Complete Hestia configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use hestia_config::HestiaConfig;
///
/// let config = HestiaConfig::default();
/// assert_eq!(config.app.name, "hestia");
/// assert!(config.contract.reject_ambiguous_output);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HestiaConfig {
    /// Application identity.
    #[serde(default)]
    pub app: AppConfig,

    /// Contract validation behavior.
    #[serde(default)]
    pub contract: ContractConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HestiaConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `app.name` is empty
    /// - `contract.max_body_bytes` is zero
    /// - `logging.level` is empty while logging is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("app.name", "must not be empty"));
        }

        if self.contract.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "contract.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs with source locations.
    ///
    /// ```
    /// use hestia_config::{HestiaConfig, LogFormat};
    ///
    /// let config = HestiaConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON info logs, strict contracts.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config.contract.reject_ambiguous_output = true;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(HestiaConfig::default().validate().is_ok());
        assert!(HestiaConfig::development().validate().is_ok());
        assert!(HestiaConfig::production().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_body_limit() {
        let mut config = HestiaConfig::default();
        config.contract.max_body_bytes = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "contract.max_body_bytes"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut config = HestiaConfig::default();
        config.app.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_level_allowed_when_logging_disabled() {
        let mut config = HestiaConfig::default();
        config.logging.level = String::new();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_sections() {
        let config = HestiaConfig::development();
        let json = serde_json::to_string(&config).unwrap();
        let back: HestiaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
