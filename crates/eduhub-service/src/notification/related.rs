//! Related-entity drill-down through registered loaders.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use eduhub_core::result::AppResult;
use eduhub_entity::notification::{RelatedEntity, RelatedEntityKind};

/// Loads a display view of one kind of related entity.
#[async_trait]
pub trait RelatedEntityLoader: Send + Sync + std::fmt::Debug {
    /// The entity kind this loader resolves.
    fn kind(&self) -> RelatedEntityKind;

    /// Load the entity. `None` when it no longer exists.
    async fn load(&self, id: Uuid) -> AppResult<Option<Value>>;
}

/// Dispatches related-entity lookups to the loader registered for each kind.
#[derive(Debug, Default)]
pub struct RelatedEntityRegistry {
    /// Registered loaders by kind.
    loaders: HashMap<RelatedEntityKind, Arc<dyn RelatedEntityLoader>>,
}

impl RelatedEntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader, replacing any previous loader for its kind.
    pub fn register(&mut self, loader: Arc<dyn RelatedEntityLoader>) {
        let kind = loader.kind();
        tracing::info!("Registered related entity loader for kind '{}'", kind);
        self.loaders.insert(kind, loader);
    }

    /// Whether a loader is registered for `kind`.
    pub fn has_loader(&self, kind: RelatedEntityKind) -> bool {
        self.loaders.contains_key(&kind)
    }

    /// Resolve a reference. Unregistered kinds and deleted entities both
    /// resolve to `None`.
    pub async fn resolve(&self, entity: &RelatedEntity) -> AppResult<Option<Value>> {
        let Some(loader) = self.loaders.get(&entity.kind) else {
            tracing::debug!(kind = %entity.kind, "No loader registered for related entity");
            return Ok(None);
        };
        loader.load(entity.id).await
    }
}
