//! # Hestia Core
//!
//! Core types for the Hestia typed-contract routing layer.
//!
//! - [`Shape`] and [`Describe`] - runtime structural descriptors and the
//!   bridge from Rust types to them
//! - [`InputContract`], [`InputContracts`], [`CombinedInputShape`] - what a
//!   route accepts, per [`InputSource`]
//! - [`OutputContract`] - what a route returns, captured at registration
//! - [`ValidatedData`] - input that passed its contracts
//! - [`Context`] - per-request context with validated input, raw request
//!   accessors, typed state and reply helpers
//! - [`Reply`] and [`IntoReply`] - handler results
//! - [`HestiaError`] - the standard error type

#![doc(html_root_url = "https://docs.rs/hestia-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod contract;
mod context;
mod describe;
mod error;
mod reply;
pub mod shape;
mod state;
mod validated;

pub use context::{Context, RequestHead, RequestId};
pub use contract::{
    CombinedInputShape, InputContract, InputContracts, InputSource, OutputContract, OutputKind,
};
pub use describe::Describe;
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, HestiaError, HestiaResult, ValidationError};
pub use reply::{IntoReply, Reply, TypedJson, TypedText};
pub use shape::{Field, ObjectShape, Shape, ShapeMismatch};
pub use state::StateStore;
pub use validated::ValidatedData;

pub use hestia_router::Params;
