//! Request payloads for the remote methods that take more than a couple of
//! arguments. `None` fields are left out of the JSON body entirely.

use serde::Serialize;

use crate::node::Node;

/// Parameters for createAccount and editAccountInfo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountParams {
    pub short_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
}

impl AccountParams {
    pub fn new(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            author_name: None,
            author_url: None,
        }
    }

    pub fn author_name(mut self, author_name: impl Into<String>) -> Self {
        self.author_name = Some(author_name.into());
        self
    }

    pub fn author_url(mut self, author_url: impl Into<String>) -> Self {
        self.author_url = Some(author_url.into());
        self
    }
}

/// Parameters for createPage and editPage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageParams {
    pub title: String,
    pub content: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    /// Ask the server to echo the stored content back in the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_content: Option<bool>,
}

impl PageParams {
    pub fn new(title: impl Into<String>, content: Vec<Node>) -> Self {
        Self {
            title: title.into(),
            content,
            author_name: None,
            author_url: None,
            return_content: None,
        }
    }

    pub fn author_name(mut self, author_name: impl Into<String>) -> Self {
        self.author_name = Some(author_name.into());
        self
    }

    pub fn author_url(mut self, author_url: impl Into<String>) -> Self {
        self.author_url = Some(author_url.into());
        self
    }

    pub fn return_content(mut self, return_content: bool) -> Self {
        self.return_content = Some(return_content);
        self
    }
}

/// Time window for getViews. Narrower fields require the wider ones
/// (hour needs day, day needs month, month needs year); the server enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewsWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
}

impl ViewsWindow {
    pub fn year(year: u16) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn month(mut self, month: u8) -> Self {
        self.month = Some(month);
        self
    }

    pub fn day(mut self, day: u8) -> Self {
        self.day = Some(day);
        self
    }

    pub fn hour(mut self, hour: u8) -> Self {
        self.hour = Some(hour);
        self
    }
}

/// Selectable fields for getAccountInfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountField {
    ShortName,
    AuthorName,
    AuthorUrl,
    AuthUrl,
    PageCount,
}

impl AccountField {
    /// Selector sent when the caller asks for no fields.
    pub const DEFAULT: [AccountField; 3] = [
        AccountField::ShortName,
        AccountField::AuthorName,
        AccountField::AuthorUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountField::ShortName => "short_name",
            AccountField::AuthorName => "author_name",
            AccountField::AuthorUrl => "author_url",
            AccountField::AuthUrl => "auth_url",
            AccountField::PageCount => "page_count",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeElement;
    use serde_json::json;

    #[test]
    fn account_params_omit_absent_fields() {
        let params = AccountParams::new("Sandbox").author_name("Anna");
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"short_name": "Sandbox", "author_name": "Anna"})
        );
    }

    #[test]
    fn page_params_serialize_content_tree() {
        let params = PageParams::new(
            "Title",
            vec![NodeElement::new("p").with_child("hi").into()],
        )
        .return_content(true);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "title": "Title",
                "content": [{"tag": "p", "children": ["hi"]}],
                "return_content": true
            })
        );
    }

    #[test]
    fn views_window_serializes_set_fields_only() {
        let window = ViewsWindow::year(2024).month(3);
        assert_eq!(
            serde_json::to_value(window).unwrap(),
            json!({"year": 2024, "month": 3})
        );
        assert_eq!(serde_json::to_value(ViewsWindow::default()).unwrap(), json!({}));
    }

    #[test]
    fn account_fields_are_snake_case() {
        assert_eq!(
            serde_json::to_value(AccountField::DEFAULT).unwrap(),
            json!(["short_name", "author_name", "author_url"])
        );
        assert_eq!(
            serde_json::to_value(AccountField::PageCount).unwrap(),
            json!("page_count")
        );
        assert_eq!(AccountField::AuthUrl.as_str(), "auth_url");
    }
}
