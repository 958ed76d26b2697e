//! REST client for the mosi marketplace backend.
//!
//! Every endpoint answers with the same JSON envelope:
//!
//! ```json
//! { "header": { "rtcd": "S00", "rtmsg": "Success" }, "body": { ... } }
//! ```
//!
//! [`envelope::decode`] turns a raw HTTP response into a [`Decoded`] value,
//! which is the single contract every client call in the workspace uses:
//!
//! - `Decoded::Ok(payload)` when the header carries the `S00` sentinel
//! - `Decoded::Err(failure)` for business, transport-status and parse failures
//! - `Decoded::Unauthenticated` for HTTP 401, after navigating to the login route
//!
//! Business failures are never returned as `Err(ApiError)`; that path is
//! reserved for requests that produced no HTTP response at all.

pub mod cart;
pub mod client;
pub mod code;
pub mod config;
pub mod envelope;
pub mod error;
pub mod navigator;

pub use cart::{CartApi, CartCount, CartKey, CartLine, CartSnapshot, HttpCartApi};
pub use client::ApiClient;
pub use code::ResponseCode;
pub use config::{ClientConfig, RouteConfig, SessionConfig};
pub use envelope::{Decoded, RawResponse, decode};
pub use error::{ApiError, ApiFailure, ApiResult, ConfigError, ErrorCategory};
pub use navigator::{Navigator, Route, RoutePaths};
