//! Configuration section types.

use serde::{Deserialize, Serialize};

/// Application identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application name, used as the service name in logs.
    #[serde(default = "default_app_name")]
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
        }
    }
}

fn default_app_name() -> String {
    "hestia".to_string()
}

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Input and output contract behavior.
///
/// # Example
///
/// ```
/// use hestia_config::ContractConfig;
///
/// let config = ContractConfig::default();
/// assert_eq!(config.max_body_bytes, 1024 * 1024);
/// assert!(config.coerce_string_sources);
/// assert!(config.reject_ambiguous_output);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// Largest `form` or `json` body the validator decodes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Coerce string leaves of param, query, form, header and cookie input
    /// to the declared primitive before validating.
    #[serde(default = "default_true")]
    pub coerce_string_sources: bool,

    /// Treat two output captures on one route as a registration error.
    /// When false the first capture is kept and a warning is logged.
    #[serde(default = "default_true")]
    pub reject_ambiguous_output: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            coerce_string_sources: true,
            reject_ambiguous_output: true,
        }
    }
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (`info`, `hestia=debug,warn`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_fill_missing_fields_with_defaults() {
        let contract: ContractConfig = toml::from_str("max_body_bytes = 2048").unwrap();
        assert_eq!(contract.max_body_bytes, 2048);
        assert!(contract.coerce_string_sources);
        assert!(contract.reject_ambiguous_output);

        let logging: LoggingConfig = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(logging.format, LogFormat::Pretty);
        assert_eq!(logging.level, "info");
        assert!(logging.enabled);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<ContractConfig, _> = toml::from_str("strict = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LogFormat::Pretty).unwrap(), "\"pretty\"");
    }
}
