//! Async API client for the telegra.ph publishing service.
//!
//! # Overview
//! `Client` exposes one async method per remote operation (accounts, pages,
//! page lists, view counts). Requests go through a pluggable `Transport`;
//! `HttpTransport` is the default, speaking JSON over a pooled HTTP client.
//! Responses are parsed into immutable records, with page content decoded
//! into a `Node` tree.
//!
//! # Design
//! - The network sits behind the `Transport` trait, so tests (and callers
//!   with their own HTTP stack) can swap it without touching `Client`.
//! - Result records are parsed by hand from `serde_json::Value` so missing
//!   fields report which record and field were at fault.
//! - No retries, caching or batching: one transport call per method, and
//!   every failure is returned to the caller as an `Error`.

pub mod client;
pub mod codec;
pub mod error;
pub mod http;
pub mod node;
pub mod params;
pub mod transport;
pub mod types;

pub use client::Client;
pub use codec::{JsonCodec, SerdeJsonCodec};
pub use error::{Error, Result};
pub use http::{HttpTransport, HttpTransportConfig};
pub use node::{Attrs, Node, NodeElement};
pub use params::{AccountField, AccountParams, PageParams, ViewsWindow};
pub use transport::{Payload, Transport};
pub use types::{Account, Page, PageList, PageViews};
