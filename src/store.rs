//! Persistence seam for the resource layer, with an in-memory implementation.
//! The engine itself never persists; a real deployment plugs its unit of work
//! in here and serializes merges against the same target behind it.

use crate::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait Repository<E>: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<E>, AppError>;
    async fn save(&self, id: Uuid, entity: E) -> Result<(), AppError>;
    async fn remove(&self, id: Uuid) -> Result<Option<E>, AppError>;
    async fn all(&self) -> Result<Vec<E>, AppError>;
}

/// Map-backed store. The guard is never held across an await.
#[derive(Default)]
pub struct MemoryStore<E> {
    items: RwLock<HashMap<Uuid, E>>,
}

impl<E> MemoryStore<E> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> Repository<E> for MemoryStore<E> {
    async fn fetch(&self, id: Uuid) -> Result<Option<E>, AppError> {
        let items = self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(items.get(&id).cloned())
    }

    async fn save(&self, id: Uuid, entity: E) -> Result<(), AppError> {
        let mut items = self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.insert(id, entity);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<Option<E>, AppError> {
        let mut items = self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(items.remove(&id))
    }

    async fn all(&self) -> Result<Vec<E>, AppError> {
        let items = self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(items.values().cloned().collect())
    }
}
