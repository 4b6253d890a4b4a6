//! HTML fragment parsing, querying and serialization.
//!
//! Fragments are parsed with html5ever's fragment algorithm in a `<body>`
//! context, so tree construction matches what a browser does for
//! `innerHTML` and unclosed elements cannot swallow surrounding markup.
//! Serialization returns the fragment root's inner HTML.

use std::rc::Rc;

use anyhow::{Context, Result};
use html5ever::driver::ParseOpts;
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{
    Attribute, LocalName, Namespace, QualName, local_name, namespace_url, ns, parse_fragment,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// A parsed HTML fragment.
pub struct HtmlDocument {
    // Keeps the tree alive; `root` points into it.
    _dom: RcDom,
    root: Handle,
}

impl HtmlDocument {
    /// Parse an HTML fragment.
    pub fn load(fragment: &str) -> Self {
        let context = QualName::new(None, ns!(html), local_name!("body"));
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
            .one(fragment);
        // The fragment algorithm puts every parsed node under one <html> root.
        let root = find_element(&dom.document, "html").unwrap_or_else(|| dom.document.clone());
        Self { _dom: dom, root }
    }

    /// Serialize the fragment back to HTML.
    pub fn serialize(&self) -> Result<String> {
        inner_html(&self.root)
    }

    /// All elements carrying every one of `attrs`, in document order.
    pub fn query_all_with(&self, attrs: &[&str]) -> Vec<Handle> {
        let mut found = Vec::new();
        collect_with_attrs(&self.root, attrs, &mut found);
        found
    }

    /// Whether `node` is still part of this document's tree.
    pub fn is_attached(&self, node: &Handle) -> bool {
        let mut current = parent_of(node);
        while let Some(parent) = current {
            if Rc::ptr_eq(&parent, &self.root) {
                return true;
            }
            current = parent_of(&parent);
        }
        false
    }

    /// Replace the children of `node` with the first node of `content`.
    ///
    /// `content` is parsed as its own fragment; its first significant child
    /// (leading whitespace-only text is skipped) is moved into this tree.
    /// Empty content leaves `node` without children.
    pub fn set_node_content(&self, node: &Handle, content: &str) {
        let replacement = HtmlDocument::load(content);
        let first = {
            let mut children = replacement.root.children.borrow_mut();
            children
                .iter()
                .position(|c| !is_blank_text(c))
                .map(|index| children.remove(index))
        };

        clear_children(node);
        if let Some(child) = first {
            append(node, child);
        }
    }
}

/// Read an attribute value.
pub fn attribute(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Set an attribute value, adding the attribute if it is missing.
/// Non-element nodes are ignored.
pub fn set_attribute(node: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| &*a.name.local == name) {
            Some(existing) => existing.value = value.into(),
            None => attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: value.into(),
            }),
        }
    }
}

/// Serialize the children of `node`.
pub fn inner_html(node: &Handle) -> Result<String> {
    let mut buf = Vec::new();
    let handle: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    serialize(&mut buf, &handle, opts).context("failed to serialize HTML")?;
    String::from_utf8(buf).context("serialized HTML is not valid UTF-8")
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Element { name, .. } if &*name.local == tag => return Some(child.clone()),
            _ => {}
        }
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

fn collect_with_attrs(node: &Handle, attrs: &[&str], found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. })
            && attrs.iter().all(|a| attribute(child, a).is_some())
        {
            found.push(child.clone());
        }
        collect_with_attrs(child, attrs, found);
    }
}

fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

fn clear_children(node: &Handle) {
    let children = std::mem::take(&mut *node.children.borrow_mut());
    for child in &children {
        child.parent.set(None);
    }
}

fn append(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

fn is_blank_text(node: &Handle) -> bool {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().trim().is_empty(),
        _ => false,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_simple_fragment() {
        let doc = HtmlDocument::load("<p>Hello <b>world</b></p>");
        assert_eq!(doc.serialize().unwrap(), "<p>Hello <b>world</b></p>");
    }

    #[test]
    fn unclosed_raw_text_elements_stay_inside_fragment() {
        let doc = HtmlDocument::load("<p>a</p><textarea>x");
        assert_eq!(doc.serialize().unwrap(), "<p>a</p><textarea>x</textarea>");

        let doc = HtmlDocument::load("<p>a</p><script>evil()");
        let html = doc.serialize().unwrap();
        assert_eq!(html, "<p>a</p><script>evil()</script>");
        assert!(!html.contains("</body>"));
    }

    #[test]
    fn set_node_content_with_unclosed_element() {
        let doc = HtmlDocument::load(r#"<div id="m"></div><p>after</p>"#);
        let node = doc.query_all_with(&["id"]).remove(0);
        doc.set_node_content(&node, "<article><title>t</article>");
        let html = doc.serialize().unwrap();
        assert!(html.starts_with(r#"<div id="m"><article><title>t"#));
        assert!(html.ends_with("</div><p>after</p>"));
        assert!(!html.contains("</html>"));
    }

    #[test]
    fn queries_elements_with_all_attributes() {
        let doc = HtmlDocument::load(
            r#"<div data-a="1" data-b="2"></div><span data-a="3"></span><p><i data-b="x" data-a="y"></i></p>"#,
        );
        let found = doc.query_all_with(&["data-a", "data-b"]);
        assert_eq!(found.len(), 2);
        assert_eq!(attribute(&found[0], "data-a").as_deref(), Some("1"));
        assert_eq!(attribute(&found[1], "data-a").as_deref(), Some("y"));
    }

    #[test]
    fn set_attribute_adds_and_overwrites() {
        let doc = HtmlDocument::load(r#"<div id="x"></div>"#);
        let node = doc.query_all_with(&["id"]).remove(0);
        set_attribute(&node, "data-entity-uuid", "abc");
        set_attribute(&node, "id", "y");
        assert_eq!(
            doc.serialize().unwrap(),
            r#"<div id="y" data-entity-uuid="abc"></div>"#
        );
    }

    #[test]
    fn set_node_content_replaces_children_with_first_node() {
        let doc = HtmlDocument::load(r#"<div id="m"><em>old</em> text</div>"#);
        let node = doc.query_all_with(&["id"]).remove(0);
        doc.set_node_content(&node, "\n  <article>new</article><p>dropped</p>");
        assert_eq!(
            doc.serialize().unwrap(),
            r#"<div id="m"><article>new</article></div>"#
        );
    }

    #[test]
    fn set_node_content_with_empty_content_clears() {
        let doc = HtmlDocument::load(r#"<div id="m">old</div>"#);
        let node = doc.query_all_with(&["id"]).remove(0);
        doc.set_node_content(&node, "");
        assert_eq!(doc.serialize().unwrap(), r#"<div id="m"></div>"#);
    }

    #[test]
    fn detached_nodes_are_reported() {
        let doc = HtmlDocument::load(r#"<div id="outer"><span id="inner"></span></div>"#);
        let nodes = doc.query_all_with(&["id"]);
        let (outer, inner) = (&nodes[0], &nodes[1]);
        assert!(doc.is_attached(inner));
        doc.set_node_content(outer, "<p>replaced</p>");
        assert!(doc.is_attached(outer));
        assert!(!doc.is_attached(inner));
    }

    #[test]
    fn attribute_on_missing_name() {
        let doc = HtmlDocument::load(r#"<div id="x"></div>"#);
        let node = doc.query_all_with(&["id"]).remove(0);
        assert!(attribute(&node, "class").is_none());
    }
}
