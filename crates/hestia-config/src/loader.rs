//! Layered configuration loading.
//!
//! Layers apply in order, later ones overriding earlier ones field by field:
//! 1. a preset (`with_defaults`, `with_development`, `with_production`)
//! 2. any number of files or strings (TOML or JSON)
//! 3. environment variables named `PREFIX__SECTION__KEY`

use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, HestiaConfig, LogFormat};

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use hestia_config::ConfigLoader;
///
/// # fn main() -> Result<(), hestia_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("hestia.toml")?
///     .with_env_prefix("HESTIA")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HestiaConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HestiaConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to the default configuration.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HestiaConfig::default();
        self
    }

    /// Reset to the development preset.
    ///
    /// ```
    /// use hestia_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HestiaConfig::development();
        self
    }

    /// Reset to the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HestiaConfig::production();
        self
    }

    /// Layer a configuration file over the current values.
    ///
    /// The format follows the extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist or cannot be read
    /// - The extension is neither `toml` nor `json`
    /// - The content does not parse or names unknown fields
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::unsupported_format(path.display().to_string()))?;

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        match format.as_str() {
            "toml" | "json" => self.with_string(&content, &format),
            _ => Err(ConfigError::unsupported_format(path.display().to_string())),
        }
    }

    /// Layer a file if it exists, otherwise continue unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file) when the file exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Layer configuration content given as a string.
    ///
    /// `format` is `"toml"` or `"json"`. Fields the content leaves out keep
    /// their current values.
    ///
    /// ```
    /// use hestia_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[contract]\nmax_body_bytes = 4096", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.contract.max_body_bytes, 4096);
    /// assert!(config.contract.coerce_string_sources);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unsupported, the content does
    /// not parse, or it names unknown fields.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer: Value = match format.to_lowercase().as_str() {
            "toml" => serde_json::to_value(toml::from_str::<toml::Table>(content)?)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported_format(format)),
        };

        let mut base = serde_json::to_value(&self.config)?;
        merge_values(&mut base, layer);
        self.config = serde_json::from_value(base)?;
        Ok(self)
    }

    /// Apply environment overrides with the given prefix at load time.
    ///
    /// With prefix `HESTIA`:
    /// - `HESTIA__APP__NAME=blog`
    /// - `HESTIA__CONTRACT__MAX_BODY_BYTES=65536`
    /// - `HESTIA__LOGGING__FORMAT=pretty`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or its parents into
    /// the process environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a specific `.env` file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or the final
    /// configuration is invalid.
    pub fn load(mut self) -> Result<HestiaConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_vars(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HestiaConfig {
        self.config
    }

    fn apply_env_vars<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{prefix}__");
        for (key, value) in vars {
            if let Some(rest) = key.strip_prefix(&marker) {
                self.apply_env_var(&key, rest, &value)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, rest: &str, value: &str) -> Result<(), ConfigError> {
        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["APP", "NAME"] => {
                self.config.app.name = value.to_string();
            }

            ["CONTRACT", "MAX_BODY_BYTES"] => {
                self.config.contract.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["CONTRACT", "COERCE_STRING_SOURCES"] => {
                self.config.contract.coerce_string_sources = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["CONTRACT", "REJECT_AMBIGUOUS_OUTPUT"] => {
                self.config.contract.reject_ambiguous_output = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => {
                self.config.logging.ansi_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unrelated variables sharing the prefix are ignored.
            _ => {}
        }

        Ok(())
    }
}

/// Deep-merges `layer` into `base`; objects merge by key, anything else
/// replaces.
fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_loader_new_uses_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, HestiaConfig::default());
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.include_location);
    }

    #[test]
    fn test_string_layer_keeps_preset_values() {
        let config = ConfigLoader::new()
            .with_development()
            .with_string("[app]\nname = \"blog\"", "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.app.name, "blog");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_json_string_layer() {
        let config = ConfigLoader::new()
            .with_string(r#"{"contract": {"reject_ambiguous_output": false}}"#, "json")
            .unwrap()
            .load()
            .unwrap();

        assert!(!config.contract.reject_ambiguous_output);
        assert_eq!(config.contract.max_body_bytes, crate::DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::new().with_string("[contract]\nstrict = true", "toml");
        assert!(matches!(result, Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigLoader::new().with_string("name: x", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_with_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nformat = \"pretty\"\nlevel = \"warn\"").unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_with_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"contract": {{"max_body_bytes": 512}}}}"#).unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.contract.max_body_bytes, 512);
    }

    #[test]
    fn test_with_file_missing() {
        let result = ConfigLoader::new().with_file("/nonexistent/hestia.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_with_file_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_optional_file_missing_is_ok() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/hestia.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, HestiaConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_vars(
                "HESTIA",
                vars(&[
                    ("HESTIA__APP__NAME", "blog"),
                    ("HESTIA__CONTRACT__MAX_BODY_BYTES", "65536"),
                    ("HESTIA__CONTRACT__COERCE_STRING_SOURCES", "off"),
                    ("HESTIA__LOGGING__FORMAT", "PRETTY"),
                    ("HESTIA__LOGGING__UNKNOWN", "ignored"),
                    ("OTHER__APP__NAME", "ignored"),
                ]),
            )
            .unwrap();
        let config = loader.load().unwrap();

        assert_eq!(config.app.name, "blog");
        assert_eq!(config.contract.max_body_bytes, 65536);
        assert!(!config.contract.coerce_string_sources);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_override_parse_errors() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_vars("HESTIA", vars(&[("HESTIA__LOGGING__ENABLED", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref var, .. } if var == "HESTIA__LOGGING__ENABLED"));

        let err = loader
            .apply_env_vars("HESTIA", vars(&[("HESTIA__CONTRACT__MAX_BODY_BYTES", "big")]))
            .unwrap_err();
        assert!(err.to_string().contains("expected integer"));
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[contract]\nmax_body_bytes = 0", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_dotenv_file_feeds_env_prefix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HESTIA_DOTENV_TEST__APP__NAME=from-dotenv").unwrap();

        let config = ConfigLoader::new()
            .with_dotenv_file(file.path())
            .unwrap()
            .with_env_prefix("HESTIA_DOTENV_TEST")
            .load()
            .unwrap();

        assert_eq!(config.app.name, "from-dotenv");
    }

    #[test]
    fn test_merge_values_is_deep() {
        let mut base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 1});
        merge_values(&mut base, serde_json::json!({"a": {"y": 3}, "c": 4}));
        assert_eq!(base, serde_json::json!({"a": {"x": 1, "y": 3}, "b": 1, "c": 4}));
    }
}
