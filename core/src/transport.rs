//! The seam between the client and the network.
//!
//! # Design
//! `Client` never talks HTTP itself. It hands a method name and a payload map
//! to a `Transport` and gets back the decoded JSON body. `HttpTransport` is the
//! production implementation; tests substitute stubs that record payloads and
//! replay canned responses.
//!
//! The trait is object safe (via `async_trait`) so the concrete transport is
//! picked at runtime and shared as `Arc<dyn Transport>`.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

/// Request body for one remote call: a JSON object keyed by parameter name.
pub type Payload = Map<String, Value>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Allocate pooled resources. Call at most once per instance.
    async fn init(&self) -> Result<()>;

    /// Release pooled resources. The instance is unusable afterwards.
    async fn shutdown(&self) -> Result<()>;

    /// Perform `method` with `payload` and return the decoded response body.
    ///
    /// Fails with `Error::Network` when the exchange itself fails and with
    /// `Error::Parse` when the body is not JSON. Dropping the returned future
    /// cancels the call.
    async fn request(&self, method: &str, payload: Payload) -> Result<Value>;
}
