//! Named text formats.
//!
//! A text format is a filter pipeline registered under a machine name.
//! Text fields reference formats by name; unknown names resolve to
//! `plain_text`, the safest option.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::embed::EntityEmbedFilter;
use super::filter::{FilterContext, FilterPipeline, FilteredHtmlFilter};

pub const PLAIN_TEXT: &str = "plain_text";
pub const FILTERED_HTML: &str = "filtered_html";
pub const FULL_HTML: &str = "full_html";
pub const EMBEDDED_HTML: &str = "embedded_html";

/// Registry of text formats.
pub struct TextFormats {
    formats: RwLock<HashMap<String, Arc<FilterPipeline>>>,
}

impl TextFormats {
    /// Registry containing the three built-in formats.
    pub fn new() -> Self {
        let formats = Self {
            formats: RwLock::new(HashMap::new()),
        };
        formats.register(PLAIN_TEXT, FilterPipeline::plain_text());
        formats.register(FILTERED_HTML, FilterPipeline::filtered_html());
        formats.register(FULL_HTML, FilterPipeline::full_html());
        formats
    }

    /// Register (or replace) a format.
    pub fn register(&self, name: &str, pipeline: FilterPipeline) {
        self.formats
            .write()
            .insert(name.to_string(), Arc::new(pipeline));
    }

    /// Register `embedded_html`: filtered HTML followed by entity embedding.
    pub fn register_embedded_html(&self, filter: EntityEmbedFilter) {
        self.register(
            EMBEDDED_HTML,
            FilterPipeline::new().add(FilteredHtmlFilter).add(filter),
        );
    }

    /// Check whether a format is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.formats.read().contains_key(name)
    }

    /// Resolve a format, falling back to plain text.
    pub fn get(&self, name: &str) -> Arc<FilterPipeline> {
        let formats = self.formats.read();
        match formats.get(name).or_else(|| formats.get(PLAIN_TEXT)) {
            Some(p) => Arc::clone(p),
            None => Arc::new(FilterPipeline::plain_text()),
        }
    }

    /// Run `input` through the named format.
    ///
    /// The registry lock is released before filtering, so filters may
    /// themselves render text through this registry.
    pub fn process(&self, name: &str, input: &str, ctx: &FilterContext) -> String {
        let pipeline = self.get(name);
        pipeline.process(input, ctx)
    }
}

impl Default for TextFormats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::filter::TextFilter;

    struct Shout;

    impl TextFilter for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn process(&self, input: &str, _ctx: &FilterContext) -> String {
            input.to_uppercase()
        }
    }

    #[test]
    fn builtins_registered() {
        let formats = TextFormats::new();
        assert!(formats.contains(PLAIN_TEXT));
        assert!(formats.contains(FILTERED_HTML));
        assert!(formats.contains(FULL_HTML));
    }

    #[test]
    fn unknown_format_falls_back_to_plain_text() {
        let formats = TextFormats::new();
        let out = formats.process("nonexistent", "<i>italic</i>", &FilterContext::new("en"));
        assert!(out.contains("&lt;i&gt;"));
    }

    #[test]
    fn registered_format_is_used() {
        let formats = TextFormats::new();
        formats.register("loud", FilterPipeline::new().add(Shout));
        let out = formats.process("loud", "hey", &FilterContext::new("en"));
        assert_eq!(out, "HEY");
    }

    #[test]
    fn full_html_passes_through() {
        let formats = TextFormats::new();
        let input = "<div data-x=\"1\">ok</div>";
        assert_eq!(formats.process(FULL_HTML, input, &FilterContext::new("en")), input);
    }
}
