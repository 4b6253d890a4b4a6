//! Render trees produced by view builders.
//!
//! A view builder describes an entity display as a tree of elements keyed by
//! region name (`title`, `body`, `links`, ...). The embed filter may drop
//! regions before a [`Renderer`](crate::host::Renderer) turns the tree into
//! markup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Element type grouping child regions.
pub const CONTAINER: &str = "container";
/// Element type carrying a text value, optionally in a text format.
pub const MARKUP: &str = "markup";

/// One node of a render tree.
///
/// Serializes with `#`-prefixed property keys; every other key is a named
/// child region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderElement {
    #[serde(rename = "#type")]
    pub element_type: String,
    #[serde(rename = "#weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    #[serde(rename = "#tag", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "#value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "#format", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "#attributes", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(flatten)]
    pub children: BTreeMap<String, RenderElement>,
}

impl RenderElement {
    /// Empty element of the given type.
    pub fn new(element_type: &str) -> Self {
        Self {
            element_type: element_type.to_string(),
            weight: None,
            tag: None,
            value: None,
            format: None,
            attributes: None,
            children: BTreeMap::new(),
        }
    }

    /// Drop a named region, returning it if present.
    pub fn remove_child(&mut self, key: &str) -> Option<RenderElement> {
        self.children.remove(key)
    }
}

/// Fluent construction of a [`RenderElement`].
///
/// Classes are collected separately and stored as an array under the
/// `class` attribute on [`build`](Self::build).
pub struct ElementBuilder {
    element: RenderElement,
    classes: Vec<String>,
    attrs: Map<String, Value>,
}

impl ElementBuilder {
    fn new(element_type: &str) -> Self {
        Self {
            element: RenderElement::new(element_type),
            classes: Vec::new(),
            attrs: Map::new(),
        }
    }

    pub fn weight(mut self, weight: i32) -> Self {
        self.element.weight = Some(weight);
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.element.tag = Some(tag.to_string());
        self
    }

    fn value(mut self, value: &str) -> Self {
        self.element.value = Some(value.to_string());
        self
    }

    fn format(mut self, format: &str) -> Self {
        self.element.format = Some(format.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), Value::from(value));
        self
    }

    pub fn child(mut self, key: &str, element: RenderElement) -> Self {
        self.element.children.insert(key.to_string(), element);
        self
    }

    pub fn build(self) -> RenderElement {
        let Self {
            mut element,
            classes,
            mut attrs,
        } = self;

        if !classes.is_empty() {
            attrs.insert("class".to_string(), Value::from(classes));
        }
        if !attrs.is_empty() {
            element.attributes = Some(Value::Object(attrs));
        }
        element
    }
}

/// Region wrapper; rendered with its tag (default `div`).
pub fn container() -> ElementBuilder {
    ElementBuilder::new(CONTAINER)
}

/// Plain text inside `tag`. The text is escaped when rendered.
pub fn markup(tag: &str, value: &str) -> ElementBuilder {
    ElementBuilder::new(MARKUP).tag(tag).value(value)
}

/// Untagged text processed by the named text format when rendered.
pub fn filtered_markup(value: &str, format: &str) -> ElementBuilder {
    ElementBuilder::new(MARKUP).value(value).format(format)
}

/// Anchor to `href` with escaped `text`.
pub fn link(href: &str, text: &str) -> ElementBuilder {
    markup("a", text).attr("href", href)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_classes_into_attributes() {
        let el = container().class("entity").class("entity--teaser").build();
        let attrs = el.attributes.unwrap();
        assert_eq!(attrs["class"][0], "entity");
        assert_eq!(attrs["class"][1], "entity--teaser");
    }

    #[test]
    fn builder_without_attrs_has_none() {
        let el = markup("p", "x").build();
        assert!(el.attributes.is_none());
        assert_eq!(el.tag.as_deref(), Some("p"));
        assert_eq!(el.element_type, MARKUP);
    }

    #[test]
    fn link_carries_href() {
        let el = link("/item/1", "One").class("read-more").build();
        let attrs = el.attributes.unwrap();
        assert_eq!(attrs["href"], "/item/1");
        assert_eq!(attrs["class"][0], "read-more");
        assert_eq!(el.value.as_deref(), Some("One"));
    }

    #[test]
    fn filtered_markup_has_format_and_no_tag() {
        let el = filtered_markup("<p>x</p>", "filtered_html").build();
        assert!(el.tag.is_none());
        assert_eq!(el.format.as_deref(), Some("filtered_html"));
    }

    #[test]
    fn serializes_with_hash_keys_and_flat_children() {
        let el = container()
            .child("title", markup("h2", "Hi").weight(-5).build())
            .build();
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["#type"], CONTAINER);
        assert_eq!(json["title"]["#tag"], "h2");
        assert_eq!(json["title"]["#weight"], -5);

        let back: RenderElement = serde_json::from_value(json).unwrap();
        assert_eq!(back.children["title"].value.as_deref(), Some("Hi"));
    }

    #[test]
    fn remove_child_drops_region() {
        let mut el = container()
            .child("links", link("/item/1", "Read more").build())
            .build();
        assert!(el.remove_child("links").is_some());
        assert!(el.children.is_empty());
        assert!(el.remove_child("links").is_none());
    }
}
