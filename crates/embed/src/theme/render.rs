//! Render tree consumer - converts RenderElement trees to HTML via Tera.

use std::sync::{Arc, Weak};

use anyhow::{Context, Result};
use serde_json::Value;
use tera::{Context as TeraContext, Tera};

use crate::content::{FilterContext, FilterPipeline, TextFormats, html_escape};
use crate::host::Renderer;
use crate::render::{CONTAINER, MARKUP, RenderElement};

/// Consumer that converts RenderElement trees to HTML.
///
/// Text values are run through their text format. Formats are held weakly:
/// a format may contain a filter that renders through this consumer.
pub struct RenderTreeConsumer {
    tera: Tera,
    formats: Weak<TextFormats>,
}

impl RenderTreeConsumer {
    /// Create a consumer with no templates (inline rendering only).
    pub fn new(formats: &Arc<TextFormats>) -> Self {
        Self::with_tera(Tera::default(), formats)
    }

    /// Create a consumer using element templates from `tera`.
    pub fn with_tera(tera: Tera, formats: &Arc<TextFormats>) -> Self {
        Self {
            tera,
            formats: Arc::downgrade(formats),
        }
    }

    /// Load element templates from a glob such as `templates/**/*.html`.
    pub fn from_glob(glob: &str, formats: &Arc<TextFormats>) -> Result<Self> {
        let tera = Tera::new(glob).with_context(|| format!("failed to load templates from {glob}"))?;
        Ok(Self::with_tera(tera, formats))
    }

    /// Render a single element and its children.
    fn render_element(&self, element: &RenderElement, ctx: &FilterContext) -> Result<String> {
        // Sort and render children first
        let children_html = self.render_children(element, ctx)?;

        let template_name = self.template_for_type(&element.element_type);
        if self.tera.get_template(&template_name).is_err() {
            return self.render_inline(element, &children_html, ctx);
        }

        let mut el_context = TeraContext::new();
        el_context.insert("element", element);
        el_context.insert("children", &children_html);
        el_context.insert("langcode", &ctx.langcode);

        if let Some(value) = &element.value {
            let processed = self.process_value(value, element.format.as_deref(), ctx);
            el_context.insert("value", &processed);
        }

        el_context.insert("tag", element.tag.as_deref().unwrap_or("div"));
        el_context.insert("class", &self.get_class_string(element));
        el_context.insert("extra_attributes", &self.get_extra_attrs(element));
        if let Some(attrs) = &element.attributes {
            el_context.insert("attributes", attrs);
        }

        self.tera
            .render(&template_name, &el_context)
            .with_context(|| format!("failed to render element type: {}", element.element_type))
    }

    /// Render element children, sorted by weight.
    fn render_children(&self, element: &RenderElement, ctx: &FilterContext) -> Result<String> {
        if element.children.is_empty() {
            return Ok(String::new());
        }

        // Collect and sort children by weight
        let mut children: Vec<_> = element.children.iter().collect();
        children.sort_by_key(|(_, child)| child.weight.unwrap_or(0));

        let mut html = String::new();
        for (_key, child) in children {
            html.push_str(&self.render_element(child, ctx)?);
        }

        Ok(html)
    }

    /// Process a value through the appropriate text format.
    fn process_value(&self, value: &str, format: Option<&str>, ctx: &FilterContext) -> String {
        let format_name = format.unwrap_or("plain_text");
        match self.formats.upgrade() {
            Some(formats) => formats.process(format_name, value, ctx),
            None => FilterPipeline::plain_text().process(value, ctx),
        }
    }

    /// Convert a classes value (array or string) to a space-separated string.
    fn classes_to_string(&self, classes: &Value) -> String {
        match classes {
            Value::Array(arr) => arr
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Value::String(s) => s.clone(),
            _ => String::new(),
        }
    }

    /// Get the template name for an element type.
    fn template_for_type(&self, element_type: &str) -> String {
        format!("elements/{element_type}.html")
    }

    /// Render an element inline when no template is available.
    fn render_inline(
        &self,
        element: &RenderElement,
        children: &str,
        ctx: &FilterContext,
    ) -> Result<String> {
        match element.element_type.as_str() {
            CONTAINER => Ok(self.render_container(element, children)),
            MARKUP => Ok(self.render_markup(element, children, ctx)),
            _ => {
                // Unknown type - wrap in a div
                let class = self.get_class_string(element);
                Ok(format!(
                    "<div class=\"element element--{}{}\">{}</div>",
                    html_escape(&element.element_type),
                    prefixed(&class),
                    children
                ))
            }
        }
    }

    /// Render a container element.
    fn render_container(&self, element: &RenderElement, children: &str) -> String {
        let tag = element.tag.as_deref().unwrap_or("div");
        let class = self.get_class_string(element);
        let attrs = self.get_extra_attrs(element);

        format!(
            "<{tag}{}{attrs}>{children}</{tag}>",
            class_attr(&class),
        )
    }

    /// Render a markup element.
    fn render_markup(&self, element: &RenderElement, children: &str, ctx: &FilterContext) -> String {
        let value = element
            .value
            .as_ref()
            .map(|v| self.process_value(v, element.format.as_deref(), ctx))
            .unwrap_or_default();

        // Formatted text without a tag is emitted as-is.
        let Some(tag) = element.tag.as_deref() else {
            return format!("{value}{children}");
        };

        let class = self.get_class_string(element);
        let attrs = self.get_extra_attrs(element);

        // Void elements (no closing tag)
        let void_elements = ["br", "hr", "img", "input", "meta", "link"];
        if void_elements.contains(&tag) {
            return format!("<{tag}{}{attrs} />", class_attr(&class));
        }

        format!("<{tag}{}{attrs}>{value}{children}</{tag}>", class_attr(&class))
    }

    /// Get class string from element attributes.
    fn get_class_string(&self, element: &RenderElement) -> String {
        element
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get("class"))
            .map(|classes| self.classes_to_string(classes))
            .unwrap_or_default()
    }

    /// Get extra attributes (excluding class) as a string.
    fn get_extra_attrs(&self, element: &RenderElement) -> String {
        let Some(Value::Object(obj)) = &element.attributes else {
            return String::new();
        };

        obj.iter()
            .filter(|(k, _)| *k != "class")
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => html_escape(s),
                    Value::Bool(b) => {
                        if *b {
                            return format!(" {k}");
                        } else {
                            return String::new();
                        }
                    }
                    _ => html_escape(&v.to_string()),
                };
                format!(" {k}=\"{value}\"")
            })
            .collect()
    }
}

impl Renderer for RenderTreeConsumer {
    fn render(&self, element: &RenderElement, langcode: &str) -> Result<String> {
        self.render_element(element, &FilterContext::new(langcode))
    }
}

fn prefixed(class: &str) -> String {
    if class.is_empty() {
        String::new()
    } else {
        format!(" {}", html_escape(class))
    }
}

fn class_attr(class: &str) -> String {
    if class.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", html_escape(class))
    }
}
