//! In-process stores. Used by tests and by the server when no database is configured.

use super::{DraftKey, DraftStore, EntityStore};
use crate::entity::{unique_key, EntityId, ListableEntity};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

fn poisoned() -> AppError {
    AppError::Internal("store lock poisoned".into())
}

/// Entities keyed by id, ids handed out from a monotonic counter.
pub struct MemoryStore<E> {
    inner: RwLock<Inner<E>>,
}

struct Inner<E> {
    rows: BTreeMap<EntityId, E>,
    next_id: i64,
}

impl<E: ListableEntity> Default for MemoryStore<E> {
    fn default() -> Self {
        MemoryStore {
            inner: RwLock::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<E: ListableEntity> MemoryStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<E: ListableEntity> EntityStore<E> for MemoryStore<E> {
    async fn load_all(&self) -> Result<Vec<E>, AppError> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: EntityId) -> Result<Option<E>, AppError> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard.rows.get(&id).cloned())
    }

    async fn persist(&self, entity: &mut E) -> Result<(), AppError> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        // Same guarantee as the UNIQUE column in Postgres.
        if let Some(key) = unique_key(entity) {
            let clash = guard
                .rows
                .values()
                .any(|other| other.id() != entity.id() && unique_key(other).as_ref() == Some(&key));
            if clash {
                return Err(AppError::DuplicateKey(E::UNIQUE_KEY.join("+")));
            }
        }
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = EntityId(guard.next_id);
                guard.next_id += 1;
                entity.set_id(id);
                id
            }
        };
        guard.rows.insert(id, entity.clone());
        Ok(())
    }

    async fn remove(&self, entity: &E) -> Result<(), AppError> {
        let id = entity
            .id()
            .ok_or_else(|| AppError::NotFound(format!("{} without id", E::KIND)))?;
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        guard
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("{} {}", E::KIND, id)))
    }
}

#[derive(Default)]
pub struct MemoryDraftStore {
    drafts: RwLock<HashMap<DraftKey, Value>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn get(&self, key: &DraftKey) -> Result<Option<Value>, AppError> {
        let guard = self.drafts.read().map_err(|_| poisoned())?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &DraftKey, value: &Value) -> Result<(), AppError> {
        let mut guard = self.drafts.write().map_err(|_| poisoned())?;
        guard.insert(key.clone(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &DraftKey) -> Result<bool, AppError> {
        let mut guard = self.drafts.write().map_err(|_| poisoned())?;
        Ok(guard.remove(key).is_some())
    }
}
