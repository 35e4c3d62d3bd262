//! JSON encoding strategy used by `HttpTransport`.
//!
//! The transport only needs two operations: turn a payload map into request
//! bytes and turn a response body into a generic `Value`. Keeping them behind
//! a trait lets an application plug in a faster encoder at construction time
//! without any observable difference on valid JSON.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::transport::Payload;

pub trait JsonCodec: Send + Sync + std::fmt::Debug {
    fn encode(&self, payload: &Payload) -> Result<Vec<u8>>;
    fn decode(&self, body: &[u8]) -> Result<Value>;
}

/// Default codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
        serde_json::to_vec(payload).map_err(Error::Encode)
    }

    fn decode(&self, body: &[u8]) -> Result<Value> {
        serde_json::from_slice(body).map_err(Error::Parse)
    }
}
