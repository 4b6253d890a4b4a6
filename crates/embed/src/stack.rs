//! Wiring of the default host services into a text format registry.

use std::sync::Arc;

use anyhow::Result;

use crate::config::EmbedSettings;
use crate::content::formats::EMBEDDED_HTML;
use crate::content::{EntityEmbedFilter, FilterContext, TextFormats};
use crate::host::{DefaultViewBuilder, EntityAccess, EntityStorage};
use crate::theme::RenderTreeConsumer;

/// Format registry whose `embedded_html` format embeds entities rendered by
/// [`DefaultViewBuilder`] and [`RenderTreeConsumer`].
///
/// Embedded text fields using `embedded_html` are filtered again, so embeds
/// nest until the depth limit.
pub struct EmbedStack {
    formats: Arc<TextFormats>,
}

impl EmbedStack {
    /// Wire the stack. `templates` is an optional Tera glob for element
    /// templates.
    pub fn new(
        storage: Arc<dyn EntityStorage>,
        access: Arc<dyn EntityAccess>,
        settings: EmbedSettings,
        templates: Option<&str>,
    ) -> Result<Self> {
        let formats = Arc::new(TextFormats::new());
        let renderer = match templates {
            Some(glob) => RenderTreeConsumer::from_glob(glob, &formats)?,
            None => RenderTreeConsumer::new(&formats),
        };

        let filter = EntityEmbedFilter::new(
            storage,
            access,
            Arc::new(DefaultViewBuilder::new()),
            Arc::new(renderer),
        )
        .with_settings(settings);
        formats.register_embedded_html(filter);

        Ok(Self { formats })
    }

    pub fn formats(&self) -> &Arc<TextFormats> {
        &self.formats
    }

    /// Run `input` through `embedded_html`.
    pub fn process(&self, input: &str, ctx: &FilterContext) -> String {
        self.formats.process(EMBEDDED_HTML, input, ctx)
    }

    /// Author tips for `embedded_html`.
    pub fn tips(&self, long: bool) -> Vec<String> {
        self.formats.get(EMBEDDED_HTML).tips(long)
    }

    /// Whether `embedded_html` output may be cached. Always false.
    pub fn is_cacheable(&self) -> bool {
        self.formats.get(EMBEDDED_HTML).is_cacheable()
    }
}
