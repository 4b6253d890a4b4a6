//! Entity embedding for rendered HTML.
//!
//! The [`EntityEmbedFilter`](content::EntityEmbedFilter) scans HTML for
//! marker elements carrying `data-entity-type`, `data-view-mode` and either
//! `data-entity-uuid` or `data-entity-id`, loads the referenced entity,
//! checks view access, renders it, and splices the markup into the marker.
//!
//! Storage, access and rendering are host services behind the traits in
//! [`host`]; in-memory and permission-based defaults are provided.

pub mod config;
pub mod content;
pub mod error;
pub mod host;
pub mod html;
pub mod models;
pub mod render;
pub mod stack;
pub mod theme;

pub use config::{Config, EmbedSettings};
pub use content::{EntityEmbedFilter, FilterContext, FilterPipeline, TextFilter, TextFormats};
pub use error::{EmbedError, EmbedResult};
