//! # Hestia Test
//!
//! In-memory testing for Hestia applications: build an [`App`], wrap it in
//! a [`TestClient`] and send requests without binding a port.
//!
//! ```rust,ignore
//! use hestia_test::TestClient;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn creates_post() {
//!     let client = TestClient::new(app());
//!
//!     client
//!         .post("/posts")
//!         .json(&json!({"title": "Hello"}))
//!         .send()
//!         .await
//!         .assert_status(StatusCode::CREATED);
//! }
//! ```
//!
//! [`App`]: hestia::App

#![warn(missing_docs)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use response::TestResponse;
