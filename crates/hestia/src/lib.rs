//! # Hestia
//!
//! A typed-contract routing layer. Each route declares the shape of the
//! input it accepts, per source, and the shape of the output it returns.
//! Requests are validated against the input contracts before the handler
//! runs, handlers read input that is already known to be well-formed, and
//! the registered routes can be exported as a [`Manifest`] for client
//! generators.
//!
//! ## Quick Start
//!
//! ```rust
//! use hestia::prelude::*;
//!
//! #[derive(Deserialize, Describe)]
//! struct CreatePost {
//!     title: String,
//!     tags: Option<Vec<String>>,
//! }
//!
//! #[derive(Serialize, Describe)]
//! struct Created {
//!     id: u64,
//!     title: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> HestiaResult<()> {
//! let mut app = App::new();
//!
//! app.post("/posts")
//!     .input_typed::<CreatePost>(InputSource::Json)
//!     .handler_with(|ctx: Context, post: CreatePost| async move {
//!         Ok(ctx.json_t(Created { id: 1, title: post.title }))
//!     })?;
//!
//! let reply = app
//!     .dispatch(RawRequest::builder()
//!         .method(Method::POST)
//!         .uri("/posts")
//!         .json(&serde_json::json!({"tags": ["rust"]}))
//!         .build())
//!     .await;
//! assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`core`] | shapes, contracts, context, replies, errors |
//! | [`router`] | path patterns |
//! | [`extract`] | raw requests and the input validator |
//! | [`config`] | layered configuration |
//! | [`telemetry`] | logging setup |

#![doc(html_root_url = "https://docs.rs/hestia/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod handler;
mod manifest;
mod registry;
mod route;

pub use app::App;
pub use manifest::{Manifest, ManifestBuilder, RouteManifest};
pub use registry::RouteRegistry;
pub use route::{Registration, RegistrationHandle, RouteBuilder};

pub use hestia_config as config;
pub use hestia_core as core;
pub use hestia_extract as extract;
pub use hestia_router as router;
pub use hestia_telemetry as telemetry;

pub use hestia_core::{
    CombinedInputShape, Context, Describe, HestiaError, HestiaResult, InputContract,
    InputContracts, InputSource, IntoReply, OutputContract, OutputKind, Reply, Shape,
    TypedJson, TypedText, ValidatedData, ValidationError,
};
pub use hestia_extract::RawRequest;
pub use hestia_macros::Describe;

/// Prelude module for convenient imports.
///
/// ```rust
/// use hestia::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{App, Manifest, RegistrationHandle};
    pub use hestia_core::{
        Context, Describe, HestiaError, HestiaResult, InputContract, InputSource, IntoReply,
        OutputContract, Reply, Shape, TypedJson, TypedText,
    };
    pub use hestia_extract::RawRequest;
    pub use hestia_macros::Describe;
    pub use http::{Method, StatusCode};
    pub use serde::{Deserialize, Serialize};
}

// Paths used by `#[derive(Describe)]` expansions.
#[doc(hidden)]
pub mod __private {
    pub use hestia_core::{Describe, Shape};
}
