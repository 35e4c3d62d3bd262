//! Page content as a tree of nodes.
//!
//! # Design
//! A node is either a text leaf or an element with a tag, optional attributes
//! and optional children. The JSON form is the one the publishing API speaks:
//! a text leaf is a bare JSON string and an element is an object with `tag`,
//! `attrs` and `children` keys. Absent optional fields are omitted when
//! serializing and come back as `None` when parsing, so
//! `parse(serialize(tree)) == tree` holds for every tree.
//!
//! Attributes are kept as an opaque JSON object; the API only documents
//! `href` and `src`, but nothing here interprets them.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Element attributes, passed through uninterpreted.
pub type Attrs = Map<String, Value>;

/// One node of page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(NodeElement),
}

/// A tagged element with optional attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeElement {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&NodeElement> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Convert the tree to its JSON form.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Text(text) => Value::String(text.clone()),
            Node::Element(element) => element.to_value(),
        }
    }

    /// Parse a single node. `null` yields `None`.
    pub fn parse(value: &Value) -> Result<Option<Node>> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(Node::Text(text.clone()))),
            Value::Object(map) => NodeElement::parse_object(map).map(|e| Some(Node::Element(e))),
            Value::Array(_) => Err(Error::MalformedContent(
                "expected a single node, found an array".to_string(),
            )),
            other => Err(Error::MalformedContent(format!(
                "expected a string or an object, found {}",
                kind(other)
            ))),
        }
    }

    /// Parse a sequence of nodes, such as page content or element children.
    /// `null` yields `None`.
    pub fn parse_list(value: &Value) -> Result<Option<Vec<Node>>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    Node::parse(item)?.ok_or_else(|| {
                        Error::MalformedContent("null entry in node list".to_string())
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            other => Err(Error::MalformedContent(format!(
                "expected an array of nodes, found {}",
                kind(other)
            ))),
        }
    }
}

impl NodeElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: None,
            children: None,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child.into());
        self
    }

    pub fn with_children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children
            .get_or_insert_with(Vec::new)
            .extend(children.into_iter().map(Into::into));
        self
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("tag".to_string(), Value::String(self.tag.clone()));
        if let Some(attrs) = &self.attrs {
            map.insert("attrs".to_string(), Value::Object(attrs.clone()));
        }
        if let Some(children) = &self.children {
            map.insert(
                "children".to_string(),
                Value::Array(children.iter().map(Node::to_value).collect()),
            );
        }
        Value::Object(map)
    }

    fn parse_object(map: &Map<String, Value>) -> Result<Self> {
        let tag = match map.get("tag") {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => {
                return Err(Error::MalformedContent(format!(
                    "element tag must be a string, found {}",
                    kind(other)
                )))
            }
            None => return Err(Error::MalformedContent("element without tag".to_string())),
        };
        let attrs = match map.get("attrs") {
            None | Some(Value::Null) => None,
            Some(Value::Object(attrs)) => Some(attrs.clone()),
            Some(other) => {
                return Err(Error::MalformedContent(format!(
                    "attrs of <{tag}> must be an object, found {}",
                    kind(other)
                )))
            }
        };
        let children = match map.get("children") {
            Some(children) => Node::parse_list(children)?,
            None => None,
        };
        Ok(Self { tag, attrs, children })
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<NodeElement> for Node {
    fn from(element: NodeElement) -> Self {
        Node::Element(element)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article() -> Vec<Node> {
        vec![
            NodeElement::new("h3").with_child("Heading").into(),
            NodeElement::new("p")
                .with_child("See ")
                .with_child(
                    NodeElement::new("a")
                        .with_attr("href", "https://example.com")
                        .with_child("this link"),
                )
                .with_child(".")
                .into(),
            NodeElement::new("figure")
                .with_child(NodeElement::new("img").with_attr("src", "/file/1.png"))
                .into(),
            NodeElement::new("br").into(),
            Node::text("trailing"),
        ]
    }

    #[test]
    fn text_serializes_to_bare_string() {
        assert_eq!(Node::text("hi").to_value(), json!("hi"));
    }

    #[test]
    fn element_omits_absent_fields() {
        let value = Node::from(NodeElement::new("br")).to_value();
        assert_eq!(value, json!({"tag": "br"}));
    }

    #[test]
    fn element_serializes_nested_children() {
        let node: Node = NodeElement::new("p")
            .with_child(NodeElement::new("a").with_attr("href", "/x").with_child("x"))
            .into();
        assert_eq!(
            node.to_value(),
            json!({"tag": "p", "children": [{"tag": "a", "attrs": {"href": "/x"}, "children": ["x"]}]})
        );
    }

    #[test]
    fn manual_and_serde_forms_agree() {
        for node in article() {
            assert_eq!(node.to_value(), serde_json::to_value(&node).unwrap());
        }
    }

    #[test]
    fn tree_roundtrips_through_json() {
        let tree = article();
        let value = Value::Array(tree.iter().map(Node::to_value).collect());
        let text = serde_json::to_string(&value).unwrap();
        let back = Node::parse_list(&serde_json::from_str(&text).unwrap()).unwrap();
        assert_eq!(back, Some(tree));
    }

    #[test]
    fn empty_children_survive_roundtrip() {
        let node: Node = NodeElement::new("p").with_children(Vec::<Node>::new()).into();
        assert_eq!(node.to_value(), json!({"tag": "p", "children": []}));
        assert_eq!(Node::parse(&node.to_value()).unwrap(), Some(node));
    }

    #[test]
    fn parse_null_is_none() {
        assert_eq!(Node::parse(&Value::Null).unwrap(), None);
        assert_eq!(Node::parse_list(&Value::Null).unwrap(), None);
    }

    #[test]
    fn parse_element_with_null_optionals() {
        let node = Node::parse(&json!({"tag": "hr", "attrs": null, "children": null}))
            .unwrap()
            .unwrap();
        assert_eq!(node, Node::Element(NodeElement::new("hr")));
    }

    #[test]
    fn parse_element_without_tag_fails() {
        let err = Node::parse(&json!({"children": ["orphan"]})).unwrap_err();
        assert!(matches!(err, Error::MalformedContent(_)));
    }

    #[test]
    fn missing_tag_deep_in_tree_fails() {
        let value = json!([{"tag": "p", "children": [{"tag": "b", "children": [{"attrs": {}}]}]}]);
        let err = Node::parse_list(&value).unwrap_err();
        assert!(matches!(err, Error::MalformedContent(_)));
    }

    #[test]
    fn parse_rejects_scalars() {
        assert!(matches!(
            Node::parse(&json!(42)).unwrap_err(),
            Error::MalformedContent(_)
        ));
        assert!(matches!(
            Node::parse_list(&json!(["ok", true])).unwrap_err(),
            Error::MalformedContent(_)
        ));
    }

    #[test]
    fn parse_rejects_non_object_attrs() {
        let err = Node::parse(&json!({"tag": "a", "attrs": "href=/x"})).unwrap_err();
        assert!(matches!(err, Error::MalformedContent(_)));
    }

    #[test]
    fn accessors_discriminate_variants() {
        let text = Node::text("t");
        assert_eq!(text.as_text(), Some("t"));
        assert!(text.as_element().is_none());

        let element: Node = NodeElement::new("p").into();
        assert_eq!(element.as_element().map(|e| e.tag.as_str()), Some("p"));
        assert!(element.as_text().is_none());
    }
}
