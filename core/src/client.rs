//! Async client for the publishing API.
//!
//! # Design
//! `Client` holds the current access token and a shared `Transport`. Each
//! remote method follows the same four steps: build a payload map, hand it to
//! the transport, check the `ok` flag, and parse `result` into a typed record.
//!
//! createAccount and revokeAccessToken replace the stored token with the one
//! the server returns, so later calls on the same client use it without the
//! caller threading it through.
//!
//! A client either owns its transport (`new`, `with_config`,
//! `with_owned_transport`) and forwards `init`/`shutdown` to it, or shares one
//! the caller manages (`with_transport`), in which case both are no-ops.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::http::{HttpTransport, HttpTransportConfig};
use crate::params::{AccountField, AccountParams, PageParams, ViewsWindow};
use crate::transport::{Payload, Transport};
use crate::types::{Account, Page, PageList, PageViews};

pub struct Client {
    token: RwLock<Option<String>>,
    transport: Arc<dyn Transport>,
    owns_transport: bool,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("has_token", &self.token().is_some())
            .field("owns_transport", &self.owns_transport)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client over the public API with a default `HttpTransport`.
    pub fn new(token: Option<String>) -> Self {
        Self::with_config(token, HttpTransportConfig::default())
    }

    pub fn with_config(token: Option<String>, config: HttpTransportConfig) -> Self {
        Self::with_owned_transport(token, HttpTransport::new(config))
    }

    /// Take ownership of `transport`; `init`/`shutdown` are forwarded to it.
    pub fn with_owned_transport(token: Option<String>, transport: impl Transport + 'static) -> Self {
        Self {
            token: RwLock::new(token),
            transport: Arc::new(transport),
            owns_transport: true,
        }
    }

    /// Share a transport whose lifecycle the caller manages.
    pub fn with_transport(token: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            token: RwLock::new(token),
            transport,
            owns_transport: false,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn owns_transport(&self) -> bool {
        self.owns_transport
    }

    pub async fn init(&self) -> Result<()> {
        if self.owns_transport {
            self.transport.init().await?;
        }
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        if self.owns_transport {
            self.transport.shutdown().await?;
        }
        Ok(())
    }

    /// createAccount. Replaces the client's token with the new account's.
    pub async fn create_account(&self, params: &AccountParams) -> Result<Account> {
        let payload = to_payload(params)?;
        let result = self.call("createAccount", payload).await?;
        let account = Account::parse(&result)?;
        self.adopt_token(&account, "createAccount");
        Ok(account)
    }

    pub async fn edit_account_info(&self, params: &AccountParams) -> Result<Account> {
        let payload = self.authed(to_payload(params)?);
        let result = self.call("editAccountInfo", payload).await?;
        Account::parse(&result)
    }

    /// getAccountInfo. An empty selector asks for short_name, author_name and
    /// author_url.
    pub async fn get_account_info(&self, fields: &[AccountField]) -> Result<Account> {
        let fields = if fields.is_empty() {
            &AccountField::DEFAULT[..]
        } else {
            fields
        };
        let mut payload = Payload::new();
        payload.insert(
            "fields".to_string(),
            fields.iter().map(|f| Value::from(f.as_str())).collect(),
        );
        let result = self.call("getAccountInfo", self.authed(payload)).await?;
        Account::parse(&result)
    }

    /// revokeAccessToken. Replaces the client's token with the fresh one.
    pub async fn revoke_access_token(&self) -> Result<Account> {
        let payload = self.authed(Payload::new());
        let result = self.call("revokeAccessToken", payload).await?;
        let account = Account::parse(&result)?;
        self.adopt_token(&account, "revokeAccessToken");
        Ok(account)
    }

    pub async fn create_page(&self, params: &PageParams) -> Result<Page> {
        let payload = self.authed(to_payload(params)?);
        let result = self.call("createPage", payload).await?;
        Page::parse(&result)
    }

    pub async fn edit_page(&self, path: &str, params: &PageParams) -> Result<Page> {
        let mut payload = to_payload(params)?;
        payload.insert("path".to_string(), Value::from(path));
        let result = self.call("editPage", self.authed(payload)).await?;
        Page::parse(&result)
    }

    /// getPage without content; see `get_page_with`.
    pub async fn get_page(&self, path: &str) -> Result<Page> {
        self.get_page_with(path, None).await
    }

    pub async fn get_page_with(&self, path: &str, return_content: Option<bool>) -> Result<Page> {
        let mut payload = Payload::new();
        payload.insert("path".to_string(), Value::from(path));
        if let Some(return_content) = return_content {
            payload.insert("return_content".to_string(), Value::from(return_content));
        }
        let result = self.call("getPage", self.authed(payload)).await?;
        Page::parse(&result)
    }

    pub async fn get_page_list(&self, offset: Option<u32>, limit: Option<u32>) -> Result<PageList> {
        let mut payload = Payload::new();
        if let Some(offset) = offset {
            payload.insert("offset".to_string(), Value::from(offset));
        }
        if let Some(limit) = limit {
            payload.insert("limit".to_string(), Value::from(limit));
        }
        let result = self.call("getPageList", self.authed(payload)).await?;
        PageList::parse(&result)
    }

    pub async fn get_views(&self, path: &str, window: ViewsWindow) -> Result<PageViews> {
        let mut payload = to_payload(&window)?;
        payload.insert("path".to_string(), Value::from(path));
        let result = self.call("getViews", self.authed(payload)).await?;
        PageViews::parse(&result)
    }

    /// Add the current token as `access_token`, if there is one.
    fn authed(&self, mut payload: Payload) -> Payload {
        if let Some(token) = self.token() {
            payload.insert("access_token".to_string(), Value::String(token));
        }
        payload
    }

    fn adopt_token(&self, account: &Account, method: &str) {
        if let Some(token) = &account.access_token {
            self.set_token(Some(token.clone()));
            info!(method, "access token replaced");
        }
    }

    /// One transport round-trip; returns the `result` member on success.
    async fn call(&self, method: &str, payload: Payload) -> Result<Value> {
        let response = self.transport.request(method, payload).await?;
        let result = unwrap_response(response);
        match &result {
            Ok(_) => debug!(method, "call succeeded"),
            Err(err) => debug!(method, error = %err, "call failed"),
        }
        result
    }
}

fn to_payload<T: Serialize>(params: &T) -> Result<Payload> {
    let value = serde_json::to_value(params).map_err(Error::Encode)?;
    serde_json::from_value(value).map_err(Error::Encode)
}

/// Check the `ok` flag of a response envelope and extract `result`.
fn unwrap_response(response: Value) -> Result<Value> {
    let Value::Object(mut envelope) = response else {
        return Err(Error::wrong_type("response", "ok", "envelope is not an object"));
    };
    match envelope.get("ok") {
        Some(Value::Bool(true)) => envelope
            .remove("result")
            .ok_or_else(|| Error::missing("response", "result")),
        Some(Value::Bool(false)) => {
            let error = match envelope.remove("error") {
                Some(Value::String(error)) => error,
                Some(other) => other.to_string(),
                None => "unknown error".to_string(),
            };
            Err(Error::Request(error))
        }
        Some(_) => Err(Error::wrong_type("response", "ok", "is not a boolean")),
        None => Err(Error::missing("response", "ok")),
    }
}
