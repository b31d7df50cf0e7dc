//! Procedural macros for Hestia.
//!
//! `#[derive(Describe)]` gives a type a runtime `Shape` so that it can be
//! used directly as an input or output contract.
//!
//! # Example
//!
//! ```rust,ignore
//! use hestia::prelude::*;
//!
//! #[derive(Deserialize, Describe)]
//! struct CreatePost {
//!     title: String,
//!     #[serde(rename = "body")]
//!     content: String,
//!     tags: Option<Vec<String>>,
//! }
//!
//! // { title: string; body: string; tags?: string[] }
//! let shape = CreatePost::shape();
//! ```
//!
//! # Attributes
//!
//! Container:
//!
//! - `#[describe(crate = "path")]`: where `Describe` and `Shape` live
//!   (defaults to the `hestia` facade)
//! - `#[describe(rename_all = "..")]` or `#[serde(rename_all = "..")]`
//!
//! Field:
//!
//! - `#[describe(rename = "..")]` or `#[serde(rename = "..")]`
//! - `#[describe(optional)]` or `#[serde(default)]`: the field may be omitted
//! - `#[describe(skip)]` or `#[serde(skip)]`: the field is not part of the shape
//! - `#[describe(flatten)]` or `#[serde(flatten)]`: the field's own object
//!   shape is merged into the parent
//!
//! `Option<T>` fields are always optional.

mod attrs;
mod describe;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Describe` for a struct or a unit-only enum.
#[proc_macro_derive(Describe, attributes(describe))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    describe::expand_describe(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
