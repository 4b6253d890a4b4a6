//! Text format filter pipeline.
//!
//! Provides the filters text formats are assembled from:
//! - plain_text: HTML-escapes all content
//! - filtered_html: Allows safe tags, strips dangerous ones
//! - full_html: No filtering (admin only)

use super::embed::{ATTR_ENTITY_ID, ATTR_ENTITY_TYPE, ATTR_ENTITY_UUID, ATTR_VIEW_MODE};

/// Per-invocation context handed to every filter.
#[derive(Debug, Clone)]
pub struct FilterContext {
    /// Language the text is being rendered in.
    pub langcode: String,
    /// Whether the caller intends to cache the result.
    pub cache: bool,
    /// Cache identifier supplied by the caller, if any.
    pub cache_id: Option<String>,
}

impl FilterContext {
    /// Context for rendering in `langcode` with caching enabled.
    pub fn new(langcode: &str) -> Self {
        Self {
            langcode: langcode.to_string(),
            cache: true,
            cache_id: None,
        }
    }

    pub fn with_cache(mut self, cache: bool, cache_id: Option<&str>) -> Self {
        self.cache = cache;
        self.cache_id = cache_id.map(str::to_string);
        self
    }
}

/// Trait for text filters in the pipeline.
pub trait TextFilter: Send + Sync {
    /// Filter name for debugging.
    fn name(&self) -> &str;

    /// Process the input text and return filtered output.
    fn process(&self, input: &str, ctx: &FilterContext) -> String;

    /// Help text shown to authors. `long` selects the detailed variant.
    fn tips(&self, _long: bool) -> String {
        String::new()
    }

    /// Whether output may be cached. Filters whose output depends on
    /// external state return false.
    fn cacheable(&self) -> bool {
        true
    }
}

/// Pipeline of text filters applied in sequence.
pub struct FilterPipeline {
    filters: Vec<Box<dyn TextFilter>>,
}

impl FilterPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add<F: TextFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Create a plain text pipeline (escapes all HTML).
    pub fn plain_text() -> Self {
        Self::new().add(HtmlEscapeFilter).add(NewlineFilter)
    }

    /// Create a filtered HTML pipeline (allows safe tags).
    pub fn filtered_html() -> Self {
        Self::new().add(FilteredHtmlFilter)
    }

    /// Create a full HTML pipeline (no filtering - admin only).
    pub fn full_html() -> Self {
        Self::new()
    }

    /// Process text through all filters in the pipeline.
    pub fn process(&self, input: &str, ctx: &FilterContext) -> String {
        self.filters
            .iter()
            .fold(input.to_string(), |acc, filter| filter.process(&acc, ctx))
    }

    /// True when every filter in the pipeline allows caching.
    pub fn is_cacheable(&self) -> bool {
        self.filters.iter().all(|f| f.cacheable())
    }

    /// Names of the filters, in order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Collected author tips of all filters.
    pub fn tips(&self, long: bool) -> Vec<String> {
        self.filters
            .iter()
            .map(|f| f.tips(long))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::plain_text()
    }
}

/// Filter that escapes all HTML characters.
pub struct HtmlEscapeFilter;

impl TextFilter for HtmlEscapeFilter {
    fn name(&self) -> &str {
        "html_escape"
    }

    fn process(&self, input: &str, _ctx: &FilterContext) -> String {
        html_escape(input)
    }

    fn tips(&self, _long: bool) -> String {
        "No HTML tags allowed.".to_string()
    }
}

/// Escape the five HTML-significant characters.
pub fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Filter that converts newlines to <br> tags.
pub struct NewlineFilter;

impl TextFilter for NewlineFilter {
    fn name(&self) -> &str {
        "newline"
    }

    fn process(&self, input: &str, _ctx: &FilterContext) -> String {
        input.replace('\n', "<br>\n")
    }

    fn tips(&self, _long: bool) -> String {
        "Lines break automatically.".to_string()
    }
}

/// Filter that sanitizes HTML with ammonia.
///
/// Scripts, styles, event handlers and unsafe URL schemes are removed. The
/// embed marker attributes are allowed on every element so markers survive
/// into a later embed filter.
pub struct FilteredHtmlFilter;

static MARKER_ATTRIBUTES: [&str; 4] = [
    ATTR_ENTITY_TYPE,
    ATTR_ENTITY_UUID,
    ATTR_ENTITY_ID,
    ATTR_VIEW_MODE,
];

impl FilteredHtmlFilter {
    fn sanitizer() -> ammonia::Builder<'static> {
        let mut builder = ammonia::Builder::default();
        builder.add_generic_attributes(&MARKER_ATTRIBUTES);
        builder
    }
}

impl TextFilter for FilteredHtmlFilter {
    fn name(&self) -> &str {
        "filtered_html"
    }

    fn process(&self, input: &str, _ctx: &FilterContext) -> String {
        Self::sanitizer().clean(input).to_string()
    }

    fn tips(&self, long: bool) -> String {
        if long {
            "Scripts, styles, event handler attributes and unsafe URL schemes are removed. \
             Other tags outside the safe list are dropped, keeping their text."
                .to_string()
        } else {
            "Scripts and event handlers are removed.".to_string()
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FilterContext {
        FilterContext::new("en")
    }

    struct Uncacheable;

    impl TextFilter for Uncacheable {
        fn name(&self) -> &str {
            "uncacheable"
        }

        fn process(&self, input: &str, ctx: &FilterContext) -> String {
            format!("{input}[{}]", ctx.langcode)
        }

        fn cacheable(&self) -> bool {
            false
        }
    }

    #[test]
    fn html_escape_filter() {
        let filter = HtmlEscapeFilter;
        assert_eq!(
            filter.process("<script>alert('xss')</script>", &ctx()),
            "&lt;script&gt;alert(&#x27;xss&#x27;)&lt;/script&gt;"
        );
    }

    #[test]
    fn newline_filter() {
        let filter = NewlineFilter;
        assert_eq!(filter.process("line1\nline2", &ctx()), "line1<br>\nline2");
    }

    #[test]
    fn filtered_html_removes_scripts() {
        let filter = FilteredHtmlFilter;
        let input = "<p>Safe</p><script>alert('xss')</script><p>Also safe</p>";
        let output = filter.process(input, &ctx());
        assert!(!output.contains("script"));
        assert!(output.contains("<p>Safe</p>"));
    }

    #[test]
    fn filtered_html_removes_event_handlers() {
        let filter = FilteredHtmlFilter;
        let input = r#"<a href="/page" onclick="alert('xss')">Link</a>"#;
        let output = filter.process(input, &ctx());
        assert!(!output.contains("onclick"));
    }

    #[test]
    fn filtered_html_removes_javascript_urls() {
        let filter = FilteredHtmlFilter;
        let input = r#"<a href="javascript:alert('xss')">Link</a>"#;
        let output = filter.process(input, &ctx());
        assert!(!output.contains("javascript:"));
    }

    #[test]
    fn filtered_html_removes_unquoted_event_handlers() {
        let output = FilteredHtmlFilter.process("<img src=x onerror=alert(1)>", &ctx());
        assert!(!output.contains("onerror"));
        assert!(!output.contains("alert"));
    }

    #[test]
    fn filtered_html_removes_unquoted_javascript_urls() {
        let output = FilteredHtmlFilter.process("<a href=javascript:alert(2)>y</a>", &ctx());
        assert!(!output.contains("javascript"));
        assert!(output.contains(">y</a>"));
    }

    #[test]
    fn filtered_html_removes_unclosed_script() {
        let output = FilteredHtmlFilter.process("<p>ok</p><script>evil()", &ctx());
        assert_eq!(output, "<p>ok</p>");
    }

    #[test]
    fn filtered_html_keeps_embed_markers() {
        let filter = FilteredHtmlFilter;
        let input = r#"<div data-entity-type="item" data-entity-id="1" data-view-mode="teaser"></div>"#;
        assert_eq!(filter.process(input, &ctx()), input);
        let input = r#"<div data-entity-type="item" data-entity-uuid="0191d6c4-0000-7000-8000-000000000001" data-view-mode="full"></div>"#;
        assert_eq!(filter.process(input, &ctx()), input);
    }

    #[test]
    fn plain_text_pipeline() {
        let pipeline = FilterPipeline::plain_text();
        let input = "<script>alert('xss')</script>\nLine 2";
        let output = pipeline.process(input, &ctx());
        assert!(!output.contains("<script>"));
        assert!(output.contains("<br>"));
    }

    #[test]
    fn full_html_pipeline_no_filtering() {
        let pipeline = FilterPipeline::full_html();
        let input = "<script>alert('test')</script><style>body{}</style>";
        assert_eq!(pipeline.process(input, &ctx()), input);
    }

    #[test]
    fn filter_pipeline_default() {
        let pipeline = FilterPipeline::default();
        let output = pipeline.process("<b>bold</b>", &ctx());
        assert!(output.contains("&lt;b&gt;"));
    }

    #[test]
    fn pipeline_cacheability_is_conjunction() {
        assert!(FilterPipeline::filtered_html().is_cacheable());
        let pipeline = FilterPipeline::filtered_html().add(Uncacheable);
        assert!(!pipeline.is_cacheable());
    }

    #[test]
    fn pipeline_passes_context() {
        let pipeline = FilterPipeline::new().add(Uncacheable);
        let output = pipeline.process("x", &FilterContext::new("fr"));
        assert_eq!(output, "x[fr]");
    }

    #[test]
    fn pipeline_tips_skip_empty() {
        let pipeline = FilterPipeline::plain_text().add(Uncacheable);
        assert_eq!(pipeline.tips(false).len(), 2);
        assert_eq!(pipeline.filter_names(), vec!["html_escape", "newline", "uncacheable"]);
    }

    #[test]
    fn context_with_cache() {
        let ctx = FilterContext::new("en").with_cache(false, Some("node:1"));
        assert!(!ctx.cache);
        assert_eq!(ctx.cache_id.as_deref(), Some("node:1"));
    }

    #[test]
    fn html_escape_all_chars() {
        assert_eq!(html_escape("<>&\"'"), "&lt;&gt;&amp;&quot;&#x27;");
    }
}
