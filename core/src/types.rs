//! Result records returned by the publishing API.
//!
//! # Design
//! Each record is built from the generic `serde_json::Value` found under the
//! response's `result` key. Parsing is done by hand rather than through
//! `Deserialize` so that a missing required field surfaces as
//! `Error::MalformedResponse` naming the record and field, and broken page
//! content surfaces as `Error::MalformedContent`.
//!
//! Optional fields that are absent or `null` become `None`; they are never
//! defaulted to zero, empty string or `false`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::node::Node;

/// An account on the publishing service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Account {
    pub short_name: Option<String>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    /// Only returned by createAccount and revokeAccessToken.
    pub access_token: Option<String>,
    /// One-time link that logs a browser into the account.
    pub auth_url: Option<String>,
    pub page_count: Option<i64>,
}

/// A single published page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub path: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub image_url: Option<String>,
    pub content: Option<Vec<Node>>,
    pub views: Option<i64>,
    pub can_edit: Option<bool>,
}

/// A slice of the account's pages, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageList {
    pub total_count: i64,
    pub pages: Option<Vec<Page>>,
}

/// View count for a page, optionally narrowed to a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageViews {
    pub views: i64,
}

impl Account {
    pub fn parse(value: &Value) -> Result<Self> {
        let fields = Fields::new("Account", value)?;
        Ok(Self {
            short_name: fields.optional_str("short_name")?,
            author_name: fields.optional_str("author_name")?,
            author_url: fields.optional_str("author_url")?,
            access_token: fields.optional_str("access_token")?,
            auth_url: fields.optional_str("auth_url")?,
            page_count: fields.optional_int("page_count")?,
        })
    }
}

impl Page {
    pub fn parse(value: &Value) -> Result<Self> {
        let fields = Fields::new("Page", value)?;
        Ok(Self {
            path: fields.required_str("path")?,
            url: fields.required_str("url")?,
            title: fields.required_str("title")?,
            description: fields.required_str("description")?,
            author_name: fields.optional_str("author_name")?,
            author_url: fields.optional_str("author_url")?,
            image_url: fields.optional_str("image_url")?,
            content: match fields.get("content") {
                Some(content) => Node::parse_list(content)?,
                None => None,
            },
            views: fields.optional_int("views")?,
            can_edit: fields.optional_bool("can_edit")?,
        })
    }
}

impl PageList {
    pub fn parse(value: &Value) -> Result<Self> {
        let fields = Fields::new("PageList", value)?;
        let pages = match fields.get("pages") {
            None => None,
            Some(Value::Array(items)) => {
                if !items.iter().all(Value::is_object) {
                    return Err(Error::wrong_type(
                        "PageList",
                        "pages",
                        "contains a non-object entry",
                    ));
                }
                Some(items.iter().map(Page::parse).collect::<Result<Vec<_>>>()?)
            }
            Some(_) => return Err(Error::wrong_type("PageList", "pages", "is not an array")),
        };
        Ok(Self {
            total_count: fields.required_int("total_count")?,
            pages,
        })
    }
}

impl PageViews {
    pub fn parse(value: &Value) -> Result<Self> {
        let fields = Fields::new("PageViews", value)?;
        Ok(Self {
            views: fields.required_int("views")?,
        })
    }
}

/// Typed lookups over one JSON object, reporting failures against `record`.
struct Fields<'a> {
    record: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(record: &'static str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { record, map }),
            _ => Err(Error::wrong_type(record, "result", "is not an object")),
        }
    }

    /// Present and non-null value for `key`.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn optional_str(&self, key: &'static str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Error::wrong_type(self.record, key, "is not a string")),
        }
    }

    fn optional_int(&self, key: &'static str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| Error::wrong_type(self.record, key, "is not an integer")),
        }
    }

    fn optional_bool(&self, key: &'static str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_bool()
                .map(Some)
                .ok_or_else(|| Error::wrong_type(self.record, key, "is not a boolean")),
        }
    }

    fn required_str(&self, key: &'static str) -> Result<String> {
        self.optional_str(key)?
            .ok_or_else(|| Error::missing(self.record, key))
    }

    fn required_int(&self, key: &'static str) -> Result<i64> {
        self.optional_int(key)?
            .ok_or_else(|| Error::missing(self.record, key))
    }
}
