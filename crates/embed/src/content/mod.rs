//! Content filtering.
//!
//! This module provides:
//! - FilterPipeline: ordered text filters forming a text format
//! - TextFormats: registry of named formats
//! - EntityEmbedFilter: replaces embed markers with rendered entities
//! - DepthGuard: nesting limit for embedded rendering

mod embed;
mod filter;
pub mod formats;
mod recursion;

pub use embed::{
    ATTR_ENTITY_ID, ATTR_ENTITY_TYPE, ATTR_ENTITY_UUID, ATTR_VIEW_MODE, EntityEmbedFilter,
};
pub use filter::{
    FilterContext, FilterPipeline, FilteredHtmlFilter, HtmlEscapeFilter, NewlineFilter,
    TextFilter, html_escape,
};
pub use formats::TextFormats;
pub use recursion::DepthGuard;
