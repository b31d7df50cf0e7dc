//! # Hestia Telemetry
//!
//! Logging setup for Hestia applications.
//!
//! Library crates in the workspace only emit `tracing` events. The
//! application decides where they go by calling [`init_logging`] once at
//! startup:
//!
//! ```rust,ignore
//! use hestia_config::ConfigLoader;
//! use hestia_telemetry::{init_logging, LogConfig};
//!
//! let config = ConfigLoader::new().with_env_prefix("HESTIA").load()?;
//! init_logging(&LogConfig::from_config(&config))?;
//! ```
//!
//! Events use the names in [`fields`] so logs from every route can be
//! queried the same way.

#![warn(missing_docs)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
