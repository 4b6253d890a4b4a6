//! In-memory entity storage with DashMap-based lookups.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;

use super::{EntityStorage, EntityTypeInfo};
use crate::models::Entity;

/// Fixture file layout accepted by [`MemoryStorage::from_json`].
#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    entity_types: Vec<EntityTypeInfo>,
    #[serde(default)]
    entities: Vec<Entity>,
}

/// Entity storage held entirely in memory.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<MemoryStorageInner>,
}

#[derive(Default)]
struct MemoryStorageInner {
    types: DashMap<String, EntityTypeInfo>,
    /// (entity type, id) -> entity.
    entities: DashMap<(String, i64), Entity>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a storage from a JSON fixture:
    /// `{"entity_types": [...], "entities": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(json).context("invalid entity fixture")?;
        let storage = Self::new();
        for info in fixture.entity_types {
            storage.register_type(info);
        }
        for entity in fixture.entities {
            storage.insert(entity);
        }
        Ok(storage)
    }

    /// Read a JSON fixture from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Register (or replace) an entity type definition.
    pub fn register_type(&self, info: EntityTypeInfo) {
        self.inner.types.insert(info.id.clone(), info);
    }

    /// Store an entity. Its type is registered with default keys if unknown.
    pub fn insert(&self, entity: Entity) {
        if !self.inner.types.contains_key(&entity.entity_type) {
            let info = EntityTypeInfo::new(&entity.entity_type, &entity.entity_type);
            self.register_type(info);
        }
        debug!(entity_type = %entity.entity_type, id = entity.id, "stored entity");
        self.inner
            .entities
            .insert((entity.entity_type.clone(), entity.id), entity);
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.inner.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entities.is_empty()
    }
}

impl EntityStorage for MemoryStorage {
    fn entity_type(&self, entity_type: &str) -> Option<EntityTypeInfo> {
        self.inner.types.get(entity_type).map(|t| t.value().clone())
    }

    fn load(&self, entity_type: &str, id: i64) -> Result<Option<Entity>> {
        Ok(self
            .inner
            .entities
            .get(&(entity_type.to_string(), id))
            .map(|e| e.value().clone()))
    }

    fn load_by_properties(
        &self,
        entity_type: &str,
        properties: &[(&str, &str)],
    ) -> Result<Vec<Entity>> {
        let mut matches: Vec<Entity> = self
            .inner
            .entities
            .iter()
            .filter(|e| e.key().0 == entity_type)
            .filter(|e| {
                properties
                    .iter()
                    .all(|(name, value)| e.value().property(name).as_deref() == Some(*value))
            })
            .map(|e| e.value().clone())
            .collect();
        // DashMap iteration order is arbitrary.
        matches.sort_by_key(|e| e.id);
        Ok(matches)
    }
}
