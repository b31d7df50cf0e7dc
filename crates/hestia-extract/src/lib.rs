//! # Hestia Extract
//!
//! Request decoding and input contract validation for Hestia.
//!
//! | Item | Role |
//! |------|------|
//! | [`RawRequest`] | The request as routing hands it over: head, body, matched params |
//! | [`decode`] | Turns one [`InputSource`] of a request into a JSON object |
//! | [`InputValidator`] | Runs a route's [`InputContracts`] and yields [`ValidatedData`] |
//!
//! [`InputSource`]: hestia_core::InputSource
//! [`InputContracts`]: hestia_core::InputContracts
//! [`ValidatedData`]: hestia_core::ValidatedData

#![doc(html_root_url = "https://docs.rs/hestia-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod raw;
mod source;
mod validator;

pub use raw::{RawRequest, RawRequestBuilder};
pub use source::decode;
pub use validator::{InputValidator, DEFAULT_MAX_BODY_BYTES};
