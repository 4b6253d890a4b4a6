//! Default view builder.

use anyhow::Result;
use serde_json::Value;

use super::ViewBuilder;
use crate::content::formats::PLAIN_TEXT;
use crate::models::{Entity, TranslatedEntity};
use crate::render::{self, RenderElement};

/// Builds `full` and `teaser` displays from an entity's title and text
/// fields. Unknown view modes render like `full`.
#[derive(Debug, Clone)]
pub struct DefaultViewBuilder {
    body_field: String,
    summary_field: String,
}

impl DefaultViewBuilder {
    pub fn new() -> Self {
        Self {
            body_field: "body".to_string(),
            summary_field: "summary".to_string(),
        }
    }

    /// Use different field names for the body and teaser summary.
    pub fn with_fields(body_field: &str, summary_field: &str) -> Self {
        Self {
            body_field: body_field.to_string(),
            summary_field: summary_field.to_string(),
        }
    }

    fn text_element(&self, value: &Value) -> Option<RenderElement> {
        let (text, format) = match value {
            Value::String(s) => (s.as_str(), PLAIN_TEXT),
            Value::Object(obj) => (
                obj.get("value")?.as_str()?,
                obj.get("format").and_then(Value::as_str).unwrap_or(PLAIN_TEXT),
            ),
            _ => return None,
        };
        Some(render::filtered_markup(text, format).build())
    }

    fn body(&self, t: &TranslatedEntity<'_>, teaser: bool) -> Option<RenderElement> {
        let summary = teaser
            .then(|| t.field(&self.summary_field))
            .flatten()
            .and_then(|v| self.text_element(v));
        summary.or_else(|| t.field(&self.body_field).and_then(|v| self.text_element(v)))
    }
}

impl Default for DefaultViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical path of an entity.
pub fn entity_path(entity: &Entity) -> String {
    format!("/{}/{}", entity.entity_type, entity.id)
}

impl ViewBuilder for DefaultViewBuilder {
    fn view(&self, entity: &Entity, view_mode: &str, langcode: &str) -> Result<RenderElement> {
        let t = entity.translation(langcode);
        let teaser = view_mode == "teaser";
        let path = entity_path(entity);

        let title = if teaser {
            render::container()
                .tag("h2")
                .class("entity__title")
                .weight(-10)
                .child("label", render::link(&path, t.title).build())
                .build()
        } else {
            render::markup("h2", t.title)
                .class("entity__title")
                .weight(-10)
                .build()
        };

        let links = if teaser {
            render::container()
                .tag("ul")
                .class("links")
                .weight(100)
                .child(
                    "read_more",
                    render::link(&path, "Read more").class("read-more").build(),
                )
                .build()
        } else {
            render::container()
                .tag("ul")
                .class("links")
                .weight(100)
                .child(
                    "permalink",
                    render::link(&path, "Permalink").class("permalink").build(),
                )
                .build()
        };

        let mut builder = render::container()
            .tag("article")
            .class("entity")
            .class(&format!("entity--{}", entity.entity_type))
            .class(&format!("entity--{}", entity.bundle))
            .class(&format!("view-mode--{view_mode}"))
            .attr("lang", t.langcode)
            .child("title", title)
            .child("links", links);

        if let Some(body) = self.body(&t, teaser) {
            builder = builder.child("body", body);
        }

        Ok(builder.build())
    }
}
