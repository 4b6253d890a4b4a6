//! Entity embed filter.
//!
//! Replaces marker elements such as
//!
//! ```html
//! <div data-entity-type="item" data-entity-uuid="…" data-view-mode="teaser"></div>
//! ```
//!
//! with the rendered entity. The marker element itself (and its attributes)
//! stays; only its children are replaced.

use std::sync::Arc;

use markup5ever_rcdom::Handle;
use tracing::{debug, error};
use uuid::Uuid;

use super::filter::{FilterContext, TextFilter};
use super::recursion::DepthGuard;
use crate::config::EmbedSettings;
use crate::error::{EmbedError, EmbedResult};
use crate::host::{EntityAccess, EntityStorage, Renderer, ViewBuilder};
use crate::html::{self, HtmlDocument};
use crate::models::Entity;

pub const ATTR_ENTITY_TYPE: &str = "data-entity-type";
pub const ATTR_ENTITY_UUID: &str = "data-entity-uuid";
pub const ATTR_ENTITY_ID: &str = "data-entity-id";
pub const ATTR_VIEW_MODE: &str = "data-view-mode";

/// Text filter that embeds rendered entities in place of marker elements.
pub struct EntityEmbedFilter {
    storage: Arc<dyn EntityStorage>,
    access: Arc<dyn EntityAccess>,
    views: Arc<dyn ViewBuilder>,
    renderer: Arc<dyn Renderer>,
    settings: EmbedSettings,
}

impl EntityEmbedFilter {
    /// Create a filter with default settings.
    pub fn new(
        storage: Arc<dyn EntityStorage>,
        access: Arc<dyn EntityAccess>,
        views: Arc<dyn ViewBuilder>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            storage,
            access,
            views,
            renderer,
            settings: EmbedSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: EmbedSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EmbedSettings {
        &self.settings
    }

    /// Replace the children of `node` with the first node of `content`.
    pub fn set_dom_node_content(doc: &HtmlDocument, node: &Handle, content: &str) {
        doc.set_node_content(node, content);
    }

    /// Embed one marker. Returns whether the marker was replaced.
    fn embed_node(
        &self,
        doc: &HtmlDocument,
        node: &Handle,
        ctx: &FilterContext,
    ) -> EmbedResult<bool> {
        let entity_type = html::attribute(node, ATTR_ENTITY_TYPE).unwrap_or_default();
        let view_mode = html::attribute(node, ATTR_VIEW_MODE).unwrap_or_default();

        let Some(entity) = self.resolve_entity(node, &entity_type)? else {
            debug!(entity_type = %entity_type, "embedded entity not found");
            return Ok(false);
        };

        if !self.access.can_view(&entity)? {
            debug!(
                entity_type = %entity_type,
                id = entity.id,
                "embedded entity not accessible"
            );
            return Ok(false);
        }

        let rendered = self.render_entity(&entity, &view_mode, &ctx.langcode)?;
        Self::set_dom_node_content(doc, node, &rendered);
        Ok(true)
    }

    /// Load the entity a marker points at, by UUID or else by numeric ID.
    ///
    /// An ID-addressed marker gains a `data-entity-uuid` attribute once the
    /// entity is loaded.
    fn resolve_entity(&self, node: &Handle, entity_type: &str) -> EmbedResult<Option<Entity>> {
        let info = self
            .storage
            .entity_type(entity_type)
            .ok_or_else(|| EmbedError::UnknownEntityType(entity_type.to_string()))?;

        if let Some(raw_uuid) = html::attribute(node, ATTR_ENTITY_UUID) {
            // Storage holds the canonical lowercase hyphenated form.
            let uuid = Uuid::parse_str(raw_uuid.trim())
                .map_err(|_| EmbedError::InvalidUuid(raw_uuid.clone()))?
                .to_string();
            let found = self
                .storage
                .load_by_properties(entity_type, &[(info.uuid_key.as_str(), uuid.as_str())])?;
            return Ok(found.into_iter().next());
        }

        if let Some(raw_id) = html::attribute(node, ATTR_ENTITY_ID) {
            let id: i64 = raw_id
                .trim()
                .parse()
                .map_err(|_| EmbedError::InvalidId(raw_id.clone()))?;
            let entity = self.storage.load(entity_type, id)?;
            if let Some(entity) = &entity {
                html::set_attribute(node, ATTR_ENTITY_UUID, &entity.uuid.to_string());
            }
            return Ok(entity);
        }

        Ok(None)
    }

    /// Render `entity` inside one level of the nesting guard.
    fn render_entity(&self, entity: &Entity, view_mode: &str, langcode: &str) -> EmbedResult<String> {
        let guard = DepthGuard::enter(self.settings.max_depth)?;
        debug!(
            entity_type = %entity.entity_type,
            id = entity.id,
            view_mode,
            depth = guard.depth(),
            "rendering embedded entity"
        );

        let mut build = self.views.view(entity, view_mode, langcode)?;
        for region in &self.settings.suppressed_regions {
            build.remove_child(region);
        }

        Ok(self.renderer.render(&build, langcode)?)
    }
}

impl TextFilter for EntityEmbedFilter {
    fn name(&self) -> &str {
        "entity_embed"
    }

    fn process(&self, input: &str, ctx: &FilterContext) -> String {
        if !(input.contains(ATTR_ENTITY_TYPE) && input.contains(ATTR_VIEW_MODE)) {
            return input.to_string();
        }

        debug!(
            langcode = %ctx.langcode,
            cache = ctx.cache,
            cache_id = ?ctx.cache_id,
            "processing entity embeds"
        );

        let doc = HtmlDocument::load(input);
        let mut replaced = 0usize;

        for node in doc.query_all_with(&[ATTR_ENTITY_TYPE, ATTR_VIEW_MODE]) {
            // An earlier replacement may have removed this marker.
            if !doc.is_attached(&node) {
                continue;
            }

            match self.embed_node(&doc, &node, ctx) {
                Ok(true) => {
                    replaced += 1;
                    if self.settings.first_match_only {
                        break;
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    error!(
                        error = %e,
                        entity_type = html::attribute(&node, ATTR_ENTITY_TYPE).as_deref(),
                        view_mode = html::attribute(&node, ATTR_VIEW_MODE).as_deref(),
                        "failed to embed entity"
                    );
                }
            }
        }

        if replaced == 0 {
            return input.to_string();
        }

        match doc.serialize() {
            Ok(html) => html,
            Err(e) => {
                error!(error = %e, "failed to serialize embedded entities");
                input.to_string()
            }
        }
    }

    fn tips(&self, long: bool) -> String {
        if long {
            format!(
                "<p>You can embed entities on any element using data attributes. Examples:</p>\
                 <ul>\
                 <li><code>&lt;div {ATTR_ENTITY_TYPE}=\"item\" \
                 {ATTR_ENTITY_UUID}=\"0191d6c4-5b1e-7c3a-9f2d-3e8a4b6c1d20\" \
                 {ATTR_VIEW_MODE}=\"teaser\"&gt;&lt;/div&gt;</code></li>\
                 <li><code>&lt;div {ATTR_ENTITY_TYPE}=\"item\" {ATTR_ENTITY_ID}=\"1\" \
                 {ATTR_VIEW_MODE}=\"full\"&gt;&lt;/div&gt;</code></li>\
                 </ul>"
            )
        } else {
            format!(
                "You can embed entities. Additional properties: {ATTR_ENTITY_TYPE}, \
                 {ATTR_ENTITY_UUID} or {ATTR_ENTITY_ID}, and {ATTR_VIEW_MODE}."
            )
        }
    }

    fn cacheable(&self) -> bool {
        false
    }
}
