//! entity-embed test utilities.
//!
//! Helpers for integration testing: entity and account fixtures, a harness
//! wiring the default host services, and assertion utilities for HTML output.

use std::sync::Arc;

use entity_embed::content::{ATTR_ENTITY_ID, ATTR_ENTITY_TYPE, ATTR_ENTITY_UUID, ATTR_VIEW_MODE};
use entity_embed::host::{EntityTypeInfo, MemoryStorage, PermissionAccess};
use entity_embed::models::{Account, Entity, EntityTranslation};
use entity_embed::stack::EmbedStack;
use entity_embed::{EmbedSettings, FilterContext};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Create a test entity of type "item" with default values.
pub fn test_entity(id: i64, bundle: &str, title: &str) -> TestEntity {
    TestEntity {
        id,
        uuid: Uuid::now_v7(),
        entity_type: "item".to_string(),
        bundle: bundle.to_string(),
        title: title.to_string(),
        author_id: Uuid::nil(),
        status: 1,
        fields: serde_json::json!({}),
        translations: Vec::new(),
    }
}

/// A test entity builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestEntity {
    pub id: i64,
    pub uuid: Uuid,
    pub entity_type: String,
    pub bundle: String,
    pub title: String,
    pub author_id: Uuid,
    pub status: i16,
    pub fields: JsonValue,
    pub translations: Vec<(String, String)>,
}

impl TestEntity {
    /// Set a custom UUID.
    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    /// Set the entity type.
    pub fn of_type(mut self, entity_type: &str) -> Self {
        self.entity_type = entity_type.to_string();
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author_id: Uuid) -> Self {
        self.author_id = author_id;
        self
    }

    /// Set as unpublished.
    pub fn unpublished(mut self) -> Self {
        self.status = 0;
        self
    }

    /// Add a single field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert(name.to_string(), value);
        }
        self
    }

    /// Add a text field.
    pub fn with_text_field(self, name: &str, value: &str, format: &str) -> Self {
        self.with_field(
            name,
            serde_json::json!({
                "value": value,
                "format": format
            }),
        )
    }

    /// Add a translated title.
    pub fn with_translated_title(mut self, langcode: &str, title: &str) -> Self {
        self.translations
            .push((langcode.to_string(), title.to_string()));
        self
    }

    /// Build the entity.
    pub fn build(self) -> Entity {
        Entity {
            id: self.id,
            uuid: self.uuid,
            entity_type: self.entity_type,
            bundle: self.bundle,
            title: self.title,
            author_id: self.author_id,
            status: self.status,
            fields: self.fields,
            language: "en".to_string(),
            translations: self
                .translations
                .into_iter()
                .map(|(langcode, title)| {
                    (
                        langcode,
                        EntityTranslation {
                            title: Some(title),
                            fields: serde_json::json!({}),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Create an authenticated test account.
pub fn test_user(permissions: &[&str]) -> Account {
    Account::authenticated(
        Uuid::now_v7(),
        permissions.iter().map(|s| s.to_string()).collect(),
    )
}

/// Create an anonymous test account.
pub fn anonymous_user() -> Account {
    Account::anonymous()
}

/// Create an admin test account.
pub fn admin_user() -> Account {
    test_user(&["administer site"])
}

/// Marker element referencing an entity by UUID.
pub fn uuid_marker(entity_type: &str, uuid: &Uuid, view_mode: &str) -> String {
    format!(
        r#"<div {ATTR_ENTITY_TYPE}="{entity_type}" {ATTR_ENTITY_UUID}="{uuid}" {ATTR_VIEW_MODE}="{view_mode}"></div>"#
    )
}

/// Marker element referencing an entity by numeric ID.
pub fn id_marker(entity_type: &str, id: i64, view_mode: &str) -> String {
    format!(
        r#"<div {ATTR_ENTITY_TYPE}="{entity_type}" {ATTR_ENTITY_ID}="{id}" {ATTR_VIEW_MODE}="{view_mode}"></div>"#
    )
}

/// Storage plus a wired [`EmbedStack`] for one viewer.
pub struct EmbedHarness {
    pub storage: MemoryStorage,
    pub stack: EmbedStack,
}

impl EmbedHarness {
    /// Harness over `entities`, viewed by `account` with default settings.
    pub fn new(entities: Vec<Entity>, account: Account) -> Self {
        Self::with_settings(entities, account, EmbedSettings::default())
    }

    /// Harness with explicit filter settings.
    pub fn with_settings(entities: Vec<Entity>, account: Account, settings: EmbedSettings) -> Self {
        let storage = MemoryStorage::new();
        storage.register_type(EntityTypeInfo::new("item", "Content"));
        for entity in entities {
            storage.insert(entity);
        }

        let stack = match EmbedStack::new(
            Arc::new(storage.clone()),
            Arc::new(PermissionAccess::new(account)),
            settings,
            None,
        ) {
            Ok(stack) => stack,
            Err(e) => panic!("failed to wire embed stack: {e:#}"),
        };

        Self { storage, stack }
    }

    /// Run `input` through `embedded_html` in English.
    pub fn process(&self, input: &str) -> String {
        self.process_in(input, "en")
    }

    /// Run `input` through `embedded_html` in `langcode`.
    pub fn process_in(&self, input: &str, langcode: &str) -> String {
        self.stack.process(input, &FilterContext::new(langcode))
    }
}

/// Assertion helpers for HTML output.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }

    /// Assert that `needle` occurs exactly `expected` times.
    pub fn occurrences(haystack: &str, needle: &str, expected: usize) {
        let actual = haystack.matches(needle).count();
        assert_eq!(
            actual, expected,
            "Expected '{}' {} times, found {}\nActual: {}",
            needle, expected, actual, haystack
        );
    }
}
