//! Host services the embed filter delegates to.
//!
//! Each concern sits behind a trait so the filter can run against any
//! backing store or theme layer. Default implementations:
//! - [`MemoryStorage`]: in-memory entity storage
//! - [`PermissionAccess`]: permission-based view access
//! - [`DefaultViewBuilder`]: render trees for `full` and `teaser`
//! - [`RenderTreeConsumer`](crate::theme::RenderTreeConsumer): render trees to HTML

mod access;
mod memory;
mod view;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::Entity;
use crate::render::RenderElement;

pub use access::PermissionAccess;
pub use memory::MemoryStorage;
pub use view::DefaultViewBuilder;

/// Entity type definition as known to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeInfo {
    /// Machine name.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Property holding the numeric ID.
    #[serde(default = "default_id_key")]
    pub id_key: String,
    /// Property holding the UUID.
    #[serde(default = "default_uuid_key")]
    pub uuid_key: String,
}

fn default_id_key() -> String {
    "id".to_string()
}

fn default_uuid_key() -> String {
    "uuid".to_string()
}

impl EntityTypeInfo {
    /// Definition using the standard `id`/`uuid` keys.
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            id_key: default_id_key(),
            uuid_key: default_uuid_key(),
        }
    }
}

/// Entity storage.
pub trait EntityStorage: Send + Sync {
    /// Look up an entity type definition.
    fn entity_type(&self, entity_type: &str) -> Option<EntityTypeInfo>;

    /// Load an entity by numeric ID.
    fn load(&self, entity_type: &str, id: i64) -> Result<Option<Entity>>;

    /// Load all entities whose properties match every `(name, value)` pair.
    fn load_by_properties(&self, entity_type: &str, properties: &[(&str, &str)])
    -> Result<Vec<Entity>>;
}

/// Access control for the current viewer.
pub trait EntityAccess: Send + Sync {
    /// Whether the current viewer may see `entity`.
    fn can_view(&self, entity: &Entity) -> Result<bool>;
}

/// Builds render trees for entities.
pub trait ViewBuilder: Send + Sync {
    /// Build the render tree for `entity` in `view_mode` and `langcode`.
    fn view(&self, entity: &Entity, view_mode: &str, langcode: &str) -> Result<RenderElement>;
}

/// Turns render trees into HTML.
pub trait Renderer: Send + Sync {
    /// Render `element` to markup.
    fn render(&self, element: &RenderElement, langcode: &str) -> Result<String>;
}
