//! Path patterns and parameter extraction for Hestia.
//!
//! Route resolution proper (which registration answers a request) belongs to
//! the application's router. This crate only provides the two pieces the
//! contract layer needs from it:
//!
//! - [`PathPattern`]: parses `/post/:id`, `/post/{id}` and `/files/*rest`
//!   patterns and matches concrete paths against them
//! - [`Params`]: the raw, percent-decoded parameter values a match captured
//!
//! # Example
//!
//! ```rust
//! use hestia_router::PathPattern;
//!
//! let pattern = PathPattern::parse("/orgs/:org/members/{member}").unwrap();
//! assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["org", "member"]);
//!
//! let params = pattern.matches("/orgs/acme/members/7").unwrap();
//! assert_eq!(params.get("org"), Some("acme"));
//! assert_eq!(params.get("member"), Some("7"));
//! ```

#![doc(html_root_url = "https://docs.rs/hestia-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod params;
mod pattern;

pub use error::PatternError;
pub use params::Params;
pub use pattern::{PathPattern, Segment};
