//! Content entity model.
//!
//! Entities are the content records the embed filter resolves. They are
//! addressable both by a numeric ID and by a UUID, and carry dynamic JSON
//! field storage plus per-language overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Content entity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Numeric identifier, unique per entity type.
    pub id: i64,

    /// Globally unique identifier.
    pub uuid: Uuid,

    /// Entity type machine name (e.g. "item", "media").
    pub entity_type: String,

    /// Bundle (content type) machine name.
    pub bundle: String,

    /// Entity label.
    pub title: String,

    /// Author user ID.
    #[serde(default = "Uuid::nil")]
    pub author_id: Uuid,

    /// Publication status (0 = unpublished, 1 = published).
    #[serde(default = "default_status")]
    pub status: i16,

    /// Dynamic field storage.
    #[serde(default = "empty_fields")]
    pub fields: Value,

    /// Source language code (default: 'en').
    #[serde(default = "default_language")]
    pub language: String,

    /// Translated title/fields keyed by language code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, EntityTranslation>,
}

/// Per-language overrides for an entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityTranslation {
    pub title: Option<String>,
    #[serde(default = "empty_fields")]
    pub fields: Value,
}

/// Resolved view of an entity in one language.
#[derive(Debug, Clone, Copy)]
pub struct TranslatedEntity<'a> {
    pub entity: &'a Entity,
    pub langcode: &'a str,
    pub title: &'a str,
    fields: &'a Value,
    overrides: Option<&'a Value>,
}

impl TranslatedEntity<'_> {
    /// Look up a field, preferring the translated value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.overrides
            .and_then(|o| o.get(name))
            .or_else(|| self.fields.get(name))
    }
}

fn default_status() -> i16 {
    1
}

fn default_language() -> String {
    "en".to_string()
}

fn empty_fields() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Entity {
    /// Check if this entity is published.
    pub fn is_published(&self) -> bool {
        self.status == 1
    }

    /// Select the translation for `langcode`, falling back to the source
    /// language when none exists.
    pub fn translation<'a>(&'a self, langcode: &'a str) -> TranslatedEntity<'a> {
        match self.translations.get(langcode) {
            Some(t) => TranslatedEntity {
                entity: self,
                langcode,
                title: t.title.as_deref().unwrap_or(&self.title),
                fields: &self.fields,
                overrides: Some(&t.fields),
            },
            None => TranslatedEntity {
                entity: self,
                langcode: &self.language,
                title: &self.title,
                fields: &self.fields,
                overrides: None,
            },
        }
    }

    /// Read a top-level property by name, as a string.
    ///
    /// Used by property queries: "id", "uuid", "bundle", "title", "status",
    /// "language" are base properties, anything else is looked up in fields.
    pub fn property(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "uuid" => Some(self.uuid.to_string()),
            "bundle" | "type" => Some(self.bundle.clone()),
            "title" => Some(self.title.clone()),
            "status" => Some(self.status.to_string()),
            "language" => Some(self.language.clone()),
            other => match self.fields.get(other)? {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                v => Some(v.to_string()),
            },
        }
    }
}
