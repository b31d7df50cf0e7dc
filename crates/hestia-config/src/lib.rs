//! # Hestia Config
//!
//! Typed, layered configuration for Hestia applications.
//!
//! ```toml
//! [app]
//! name = "blog"
//!
//! [contract]
//! max_body_bytes = 1048576
//! coerce_string_sources = true
//! reject_ambiguous_output = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! Every section and field is optional. Unknown fields are rejected.
//!
//! ## Environment variables
//!
//! With [`ConfigLoader::with_env_prefix`], variables named
//! `PREFIX__SECTION__KEY` override loaded values:
//!
//! - `HESTIA__APP__NAME=blog`
//! - `HESTIA__CONTRACT__REJECT_AMBIGUOUS_OUTPUT=false`
//! - `HESTIA__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HestiaConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    AppConfig, ContractConfig, LogFormat, LoggingConfig, DEFAULT_MAX_BODY_BYTES,
};
